pub mod draft_repo;

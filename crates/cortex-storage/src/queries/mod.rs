pub mod job_crud;
pub mod memory_crud;

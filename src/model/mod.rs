pub mod project;
pub mod rate_table;
pub mod work_record;
pub mod worker;

pub mod rate_table;
pub mod report;
pub mod work_record;
pub mod worker;

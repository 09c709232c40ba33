pub mod company;
pub mod report;
pub mod vacancy;

// Resource models over normalized API responses

mod collection;
mod earning;
mod employee;

pub use collection::Collection;
pub use earning::{Earning, EarningInput};
pub use employee::{Employee, EmployeeInput};

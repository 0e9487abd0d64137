//! Request and response bodies

pub mod add;

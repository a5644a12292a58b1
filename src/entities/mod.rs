pub mod prelude;

pub mod options;

pub mod check;
pub mod defaults;
pub mod simulate;

mod common;

mod wizard;

pub mod path_input;
pub mod test_helpers;

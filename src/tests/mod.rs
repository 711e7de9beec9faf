mod settings_tests;
mod utils;

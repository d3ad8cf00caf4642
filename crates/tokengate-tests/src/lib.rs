pub mod helpers;

#[cfg(test)]
mod api_tests;

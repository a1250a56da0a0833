pub mod rainbet;

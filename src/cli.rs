pub mod asm2d_help;
pub mod cli_asm2d;
pub mod cli_examples;
pub mod cli_main;

#[allow(non_snake_case)]
pub mod ASM2d;
#[allow(non_snake_case)]
pub mod Examples;
pub mod cli;

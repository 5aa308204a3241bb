/// ready-to-run ASM2d cases: rates, stoichiometry, A2O steady state, MLE dynamics,
/// temperature sweep
pub mod asm2d_examples;

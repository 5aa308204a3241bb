use crate::Examples::asm2d_examples::asm2d_examples;
use std::io::{self, Write};

pub fn examples_menu() {
    loop {
        println!("\n=== Examples ===");
        println!("1. Process rates of a mixed liquor");
        println!("2. Stoichiometric matrix and balances");
        println!("3. A2O plant, steady state");
        println!("4. MLE plant, dynamic run");
        println!("5. Temperature sweep");
        println!("0. Back to main menu");
        print!("Enter your choice: ");
        io::stdout().flush().unwrap();

        let choice = get_user_input();
        match choice.trim() {
            "1" => asm2d_examples(0),
            "2" => asm2d_examples(1),
            "3" => asm2d_examples(2),
            "4" => asm2d_examples(3),
            "5" => asm2d_examples(4),
            "0" => break,
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn get_user_input() -> String {
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .expect("Failed to read input");
    input
}

use crate::ASM2d::parameters::{
    ArrheniusCoefficients, KineticParameters, StoichiometricParameters, pretty_print_parameters,
};
use crate::ASM2d::simulation::ASM2dSimulation;
use crate::ASM2d::task_parser_ASM2d::{create_template, load_task};
use crate::cli::asm2d_help::ASM2D_ENG_HELPER;
use std::io::{self, Write};
use std::path::PathBuf;

pub fn asm2d_menu() {
    loop {
        println!("\n=== ASM2d Plant Simulation ===");
        println!("\x1b[33m1. Solve from file\x1b[0m");
        println!("\x1b[33m2. Auto-discover task files\x1b[0m");
        println!("\x1b[33m3. Generate template\x1b[0m");
        println!("\x1b[33m4. Show default parameters\x1b[0m");
        println!("\x1b[33m5. Read help\x1b[0m");
        println!("\x1b[33m0. Back to main menu\x1b[0m");
        print!("\x1b[36mEnter your choice: \x1b[0m");
        io::stdout().flush().unwrap();

        let choice = get_user_input();
        match choice.trim() {
            "1" => solve_from_file(),
            "2" => auto_solve_tasks(),
            "3" => match create_template(None) {
                Ok(path) => println!("Template written to {:?}", path),
                Err(e) => println!("Could not write template: {}", e),
            },
            "4" => show_default_parameters(),
            "5" => show_help(),
            "0" => break,
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn solve_from_file() {
    print!("\x1b[36mEnter file path: \x1b[0m");
    io::stdout().flush().unwrap();
    let file_path = get_user_input();
    let path = PathBuf::from(file_path.trim());

    if path.exists() {
        solve_from_file_dialog(path);
    } else {
        println!("File not found: {}", file_path.trim());
    }
}

fn auto_solve_tasks() {
    use std::{env, fs};

    let current_dir = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            println!("Failed to get current directory: {}", e);
            return;
        }
    };
    println!("Searching for task files in: {:?}", current_dir);

    let mut found_files = false;

    if let Ok(entries) = fs::read_dir(&current_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(filename) = path.file_name() {
                let filename_str = filename.to_string_lossy();
                if filename_str.starts_with("asm2d")
                    && filename_str.ends_with(".json")
                    && path.is_file()
                {
                    println!("Found task file: {:?}", path);
                    solve_from_file_dialog(path);
                    found_files = true;
                }
            }
        }
    }

    if !found_files {
        println!("No asm2d*.json files found in current directory.");
    }
}

fn get_user_input() -> String {
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .expect("Failed to read input");
    input
}

pub fn solve_from_file_dialog(path: PathBuf) {
    let task = match load_task(&path) {
        Ok(task) => task,
        Err(e) => {
            println!("Error parsing task file: {}", e);
            return;
        }
    };
    println!("Task parsed successfully");
    println!(
        "{}: {} zones, T = {} C, Q = {} m3/d, RAS {}, IR {}, mode {:?}",
        task.problem_name.as_deref().unwrap_or("unnamed task"),
        task.network.zones.len(),
        task.temperature,
        task.network.influent_flow,
        task.network.return_sludge,
        task.network.internal_recycle,
        task.mode
    );

    print!("\x1b[36mStart calculation? (y/n): \x1b[0m");
    io::stdout().flush().unwrap();
    let choice = get_user_input();

    if choice.trim().to_lowercase() == "y" || choice.trim().to_lowercase() == "yes" {
        let outcome = ASM2dSimulation::from_task(&task).and_then(|mut simulation| {
            simulation.solve()?;
            simulation.pretty_print();
            Ok(simulation)
        });
        match outcome {
            Ok(simulation) => {
                print!("\x1b[36mShow process rates of each zone? (y/n): \x1b[0m");
                io::stdout().flush().unwrap();
                if get_user_input().trim().to_lowercase().starts_with('y') {
                    if let Err(e) = simulation.process_rates_report() {
                        println!("{}", e);
                    }
                }
            }
            Err(e) => println!("Calculation failed: {}", e),
        }
    } else {
        println!("Calculation cancelled. Returning to menu.");
    }
}

fn show_default_parameters() {
    let printed = pretty_print_parameters("kinetic parameter", &KineticParameters::default())
        .and_then(|_| {
            pretty_print_parameters("Arrhenius coefficient", &ArrheniusCoefficients::default())
        })
        .and_then(|_| {
            pretty_print_parameters(
                "stoichiometric parameter",
                &StoichiometricParameters::default(),
            )
        });
    if let Err(e) = printed {
        println!("{}", e);
    }
}

fn show_help() {
    println!("\n=== ASM2d Help ===");
    println!("{}", ASM2D_ENG_HELPER);
    println!("\nPress Enter to return to menu...");
    let _ = get_user_input();
}

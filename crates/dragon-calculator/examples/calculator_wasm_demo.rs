//! Calculator widget demo on the mock DOM
//!
//! Clicks keypad buttons by element id and runs the unified checks against
//! the same widget.
//!
//! Run with: cargo run --example calculator_wasm_demo

use dragon_calculator::driver::{run_all_checks, CalculatorDriver};
use dragon_calculator::wasm::{Keypad, WasmDriver};

fn main() {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║            Dragon Calculator - Mock DOM Widget               ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    println!("📦 Keypad:");
    let keypad = Keypad::calculator();
    let (rows, cols) = keypad.dimensions();
    for row in 0..rows {
        let labels: Vec<String> = (0..cols)
            .filter_map(|col| keypad.get_button_at(row, col))
            .map(|b| format!("{:^5}", b.key.label()))
            .collect();
        println!("   [{}]", labels.join("|"));
    }
    println!();

    let mut driver = WasmDriver::new();

    println!("🧮 Clicking 3 + 4 × 2 =");
    for id in ["btn-3", "btn-plus", "btn-4", "btn-times", "btn-2", "btn-equals"] {
        driver.click(id);
    }
    println!("   input:  {}", driver.get_input());
    println!("   result: {}", driver.get_result());

    println!("\n🧮 Typing 9 ÷ 0 Enter");
    for key in ["9", "/", "0", "Enter"] {
        driver.key_press(key);
    }
    println!("   input:  {}", driver.get_input());
    println!("   result: {}", driver.get_result());

    println!("\n📜 DOM events:");
    for (i, event) in driver.dom().event_history().iter().enumerate() {
        println!("   [{i}] {event:?}");
    }

    println!("\n✅ Running unified checks on the mock DOM...");
    let mut fresh = WasmDriver::new();
    run_all_checks(&mut fresh);
    println!("   all checks passed");
}

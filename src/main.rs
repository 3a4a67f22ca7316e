#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    fausee_desktop_lib::run()
}

mod api;
mod app;
mod report;
mod session;
mod signup;
mod staging;
mod utils;

use app::ChurnSight;
use eframe::CreationContext;

fn main() {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([720.0, 780.0])
            .with_min_inner_size([540.0, 620.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "ChurnSight Desktop",
        options,
        Box::new(|cc: &CreationContext| Box::new(ChurnSight::new(cc))),
    );
    if let Err(e) = result {
        eprintln!("Failed to start ChurnSight Desktop: {}", e);
    }
}

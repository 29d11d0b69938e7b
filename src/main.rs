mod app;
mod chat;
mod event;
mod gemini;
mod theme;

use app::ProbetaApp;
use eframe::egui;
use gemini::GeminiClient;
use std::sync::mpsc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // The credential is required before any window opens; a missing or empty
    // key is fatal at startup.
    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    if api_key.trim().is_empty() {
        log::error!("🔑 API Key não encontrada. Defina a variável de ambiente GEMINI_API_KEY.");
        std::process::exit(1);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("probeta-runtime")
        .build()?;

    let (tx, rx) = mpsc::channel();
    let client = GeminiClient::new(api_key);
    log::info!("modelo Gemini inicializado: {}", client.model());

    let app = ProbetaApp::new(rx, tx, client, runtime.handle().clone());
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([860.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "AI Testing Helper",
        native_options,
        Box::new(move |creation_context| {
            app.apply_theme(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}

use crate::chat::prompt::build_prompt;
use crate::chat::{self, ChatState, Message};
use crate::event::AppEvent;
use crate::gemini::GeminiClient;
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use tokio::runtime::Handle;

pub struct ProbetaApp {
    rx: Receiver<AppEvent>,
    tx: Sender<AppEvent>,
    client: Arc<GeminiClient>,
    runtime: Handle,
    theme: Theme,
    chat: ChatState,
    input_buffer: String,
    awaiting_reply: bool,
    scroll_to_bottom: bool,
}

impl ProbetaApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        tx: Sender<AppEvent>,
        client: GeminiClient,
        runtime: Handle,
    ) -> Self {
        Self {
            rx,
            tx,
            client: Arc::new(client),
            runtime,
            theme: Theme::default(),
            chat: ChatState::new(),
            input_buffer: String::new(),
            awaiting_reply: false,
            scroll_to_bottom: false,
        }
    }

    pub fn apply_theme(&self, ctx: &egui::Context) {
        self.theme.apply_visuals(ctx);
    }

    fn submit_prompt(&mut self, ctx: &egui::Context) {
        let prompt = self.input_buffer.trim().to_string();
        if prompt.is_empty() || self.awaiting_reply {
            return;
        }

        // The history handed to the prompt builder already contains the turn
        // just pushed; the builder appends the utterance again as the final
        // "Usuário:" line before the completion anchor.
        self.chat.push(Message::user(prompt.clone()));
        let full_prompt = build_prompt(self.chat.messages(), &prompt);
        log::debug!("prompt assembled ({} chars)", full_prompt.len());

        self.input_buffer.clear();
        self.awaiting_reply = true;
        self.scroll_to_bottom = true;

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let repaint_ctx = ctx.clone();
        self.runtime.spawn(async move {
            let event = match client.generate(&full_prompt).await {
                Ok(text) => AppEvent::ReplyReady(text),
                Err(err) => AppEvent::ReplyFailed(err),
            };
            let _ = tx.send(event);
            repaint_ctx.request_repaint();
        });
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ReplyReady(text) => {
                self.chat.push(Message::assistant(text));
            }
            AppEvent::ReplyFailed(err) => {
                log::warn!("completion failed: {err}");
                self.chat.push(Message::assistant(chat::failure_text(&err)));
            }
        }
        self.awaiting_reply = false;
        self.scroll_to_bottom = true;
    }

    fn render_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("config_panel")
            .resizable(false)
            .default_width(230.0)
            .show(ctx, |ui| {
                ui.heading("⚙️ Configurações");
                ui.add_space(self.theme.spacing_12);

                let clear = ui.add_enabled(
                    !self.awaiting_reply,
                    egui::Button::new("🗑️ Limpar Conversa"),
                );
                if clear.clicked() {
                    self.chat.clear();
                    self.scroll_to_bottom = true;
                }

                ui.separator();
                ui.strong("📊 Estatísticas");
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Mensagens trocadas").color(self.theme.text_muted));
                    ui.strong(self.chat.len().to_string());
                });
            });
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("🤖 AI Testing Helper");
            ui.label(
                RichText::new(
                    "Bem-vindo ao seu assistente virtual inteligente para auxílio na geração de testes unitários!",
                )
                .color(self.theme.text_muted),
            );
            ui.separator();

            let transcript_height = (ui.available_height() - 120.0).max(120.0);
            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .max_height(transcript_height)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for message in self.chat.messages() {
                        let (tag, color) = if message.role == "user" {
                            ("Você", self.theme.accent_primary)
                        } else {
                            ("Assistente", self.theme.success)
                        };
                        self.theme.card_frame().show(ui, |ui| {
                            ui.label(RichText::new(tag).color(color).strong());
                            ui.label(message.content.as_str());
                        });
                    }

                    if self.awaiting_reply {
                        ui.label(RichText::new("🤔 Pensando...").color(self.theme.text_muted));
                    }

                    if self.scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
            self.scroll_to_bottom = false;

            ui.separator();

            let input_enabled = !self.awaiting_reply;
            let hint = if self.awaiting_reply {
                "Aguardando resposta..."
            } else {
                "💬 Digite sua mensagem aqui..."
            };

            let mut send_now = false;
            self.theme.composer_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    let response = ui.add_enabled(
                        input_enabled,
                        egui::TextEdit::singleline(&mut self.input_buffer)
                            .desired_width(f32::INFINITY)
                            .hint_text(hint),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        send_now = true;
                    }

                    let clicked = ui
                        .add_enabled(
                            input_enabled && !self.input_buffer.trim().is_empty(),
                            egui::Button::new("Enviar"),
                        )
                        .clicked();
                    send_now |= clicked;
                });
            });

            if send_now && input_enabled {
                self.submit_prompt(ctx);
            }
        });
    }
}

impl eframe::App for ProbetaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.render_sidebar(ctx);
        self.render_center_panel(ctx);
    }
}

/// Portal palette used by the result dialog and status labels.
pub mod palette {
    use eframe::egui::Color32;

    pub const SUCCESS: Color32 = Color32::from_rgb(0, 180, 0);
    pub const ERROR: Color32 = Color32::from_rgb(220, 50, 50);
    pub const MUTED: Color32 = Color32::from_rgb(150, 150, 150);

    pub const CUSTOMER_ACCENT: Color32 = Color32::from_rgb(0x9c, 0x27, 0xb0);
    pub const AUDIO_ACCENT: Color32 = Color32::from_rgb(0x21, 0x96, 0xf3);
    pub const DATA_ACCENT: Color32 = Color32::from_rgb(0x3f, 0x51, 0xb5);
    pub const CHAT_ACCENT: Color32 = Color32::from_rgb(0xff, 0xc1, 0x07);
    pub const FINAL_ACCENT: Color32 = Color32::from_rgb(0x4c, 0xaf, 0x50);

    pub const STAY: Color32 = Color32::from_rgb(0x2e, 0x7d, 0x32);
    pub const CHURN: Color32 = Color32::from_rgb(0xc6, 0x28, 0x28);
}

use std::sync::OnceLock;

use rust_embed::RustEmbed;
use tracing::warn;

#[derive(RustEmbed)]
#[folder = "assets"]
struct EmbeddedAssets;

static MAIN_CSS: OnceLock<String> = OnceLock::new();

/// Contents of `assets/main.css`, or an empty sheet if it failed to embed.
pub fn main_css() -> &'static str {
    MAIN_CSS.get_or_init(|| load_text("main.css")).as_str()
}

fn load_text(name: &str) -> String {
    let Some(file) = EmbeddedAssets::get(name) else {
        warn!(asset = name, "embedded asset missing");
        return String::new();
    };
    match String::from_utf8(file.data.into_owned()) {
        Ok(text) => text,
        Err(_) => {
            warn!(asset = name, "embedded asset is not valid UTF-8");
            String::new()
        }
    }
}

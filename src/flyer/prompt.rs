//! Instruction text sent with every flyer request.

use crate::flyer::types::{FlyerRequest, TextPosition};

/// Official institution name. The `â` must survive into the flyer.
pub const UNIVERSITY_NAME: &str = "Institut Universitaire La Grâce (IUG Ex-ECO.TE.S)";
/// Official website.
pub const OFFICIAL_WEBSITE: &str = "www.iuguniversity.org";
/// Official contact email.
pub const OFFICIAL_EMAIL: &str = "info@iuguniversity.org";
/// Official phone numbers.
pub const OFFICIAL_PHONES: &str = "+2290198223211, +2290153321260";

/// Returns the official numbers followed by any caller-supplied ones.
pub fn phone_line(extra_phones: &str) -> String {
    let extra = extra_phones.trim();
    if extra.is_empty() {
        OFFICIAL_PHONES.to_string()
    } else {
        format!("{}, {}", OFFICIAL_PHONES, extra)
    }
}

fn placement_rule(position: TextPosition) -> String {
    let mut rule = format!(
        "- Place ALL flyer text strictly in this position: {}.\n       \
         - Do NOT move, split or relocate text for aesthetic reasons.",
        position.label()
    );
    if position.is_overlay() {
        rule.push_str(
            "\n       - Text is drawn over the images: guarantee strong contrast \
             (dark scrim, solid band or outline) so every word stays legible.",
        );
    } else {
        rule.push_str("\n       - Text must not cover any part of the provided images.");
    }
    rule
}

/// Builds the instruction text for `request`.
///
/// The image count, language and position label appear verbatim.
pub fn build_instruction(request: &FlyerRequest) -> String {
    let image_count = request.user_images.len();
    let language = request.language.as_str();

    format!(
        "ROLE: Professional university flyer image generator for {name}.

    INSTITUTIONAL IDENTITY:
    - Name: \"{name}\". Write it EXACTLY as given, keeping the accent in \"Grâce\". Never write \"Grace\".
    - Website: {website}
    - Email: {email}
    - Phone: {phones}

    CORE OBJECTIVE:
    Produce a single, clean, professional flyer image using:
    1. EXACTLY {image_count} image(s) uploaded by the user. Do NOT duplicate, mirror, or invent images.
    2. LANGUAGE: Strictly {language}. All text must be in {language}.
    3. THEME: {theme}
    4. BACKGROUND COLOR: {background}.
       - Apply soft gradients, smooth color blends, or subtle geometric shapes using ONLY these colors.
       - Do NOT use noisy textures or photo backgrounds.
       - Ensure high readability.
    5. TEXT POSITION: {position}
       {placement}

    MANDATORY BRANDING RULES:
    - TOP SECTION: University Name \"{name}\" (Text in Blue and White) and the official logo.
    - BOTTOM SECTION:
      Website: {website}
      Email: {email}
      Phone: {phones}

    CONSTRAINTS:
    - Use ONLY the provided images.
    - Academic, professional visual style.
    - Clear hierarchy and excellent readability.
    - Output ONLY the final flyer image.
",
        name = UNIVERSITY_NAME,
        website = OFFICIAL_WEBSITE,
        email = OFFICIAL_EMAIL,
        phones = phone_line(&request.extra_phones),
        image_count = image_count,
        language = language,
        theme = request.description,
        background = request.background_color,
        position = request.text_position.label(),
        placement = placement_rule(request.text_position),
    )
}

use std::borrow::Cow;

use rust_embed::RustEmbed;

const EMBEDDED_PREFIX: &str = "/assets/icons/";
const FALLBACK_ALT: &str = "icon";

/// A reference to an image asset plus its alternative text.
///
/// Sources under `/assets/icons/` resolve against the icon pack embedded in
/// the crate; anything else is passed through to the host untouched.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct IconAsset {
    src: Cow<'static, str>,
    alt: Cow<'static, str>,
}

impl IconAsset {
    pub const USER: Self = Self::from_static("/assets/icons/user.svg", "user");
    pub const EMAIL: Self = Self::from_static("/assets/icons/email.svg", "email");
    pub const CALENDAR: Self = Self::from_static("/assets/icons/calendar.svg", "calendar");
    pub const UPLOAD: Self = Self::from_static("/assets/icons/upload.svg", "upload");
    pub const LOADING: Self = Self::from_static("/assets/icons/loading.svg", "loading");
    pub const CHECK: Self = Self::from_static("/assets/icons/check.svg", "check");

    pub fn new(src: impl Into<Cow<'static, str>>, alt: impl Into<Cow<'static, str>>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
        }
    }

    pub const fn from_static(src: &'static str, alt: &'static str) -> Self {
        Self {
            src: Cow::Borrowed(src),
            alt: Cow::Borrowed(alt),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn alt(&self) -> &str {
        if self.alt.trim().is_empty() {
            FALLBACK_ALT
        } else {
            &self.alt
        }
    }

    pub fn embedded_path(&self) -> Option<&str> {
        self.src
            .strip_prefix(EMBEDDED_PREFIX)
            .filter(|path| !path.is_empty() && !path.contains(".."))
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded_path()
            .is_some_and(|path| IntakeIcons::get(path).is_some())
    }

    /// Returns the SVG bytes for embedded icons, `None` for external sources.
    pub fn resolve(&self) -> Option<Cow<'static, [u8]>> {
        let path = self.embedded_path()?;
        IntakeIcons::get(path).map(|file| file.data)
    }
}

pub fn embedded_icon_names() -> Vec<String> {
    let mut names = IntakeIcons::iter()
        .filter_map(|path| path.strip_suffix(".svg").map(str::to_string))
        .collect::<Vec<_>>();
    names.sort();
    names
}

#[derive(RustEmbed)]
#[folder = "assets/icons"]
struct IntakeIcons;

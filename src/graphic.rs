//! Overlay graphic sources and SVG parsing using resvg/usvg.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use resvg::usvg::{Options, Tree};

use crate::error::EditorError;

// ============================================================================
// SvgSource
// ============================================================================

/// A source for overlay SVG data.
///
/// # Example
///
/// ```
/// use livery_studio::SvgSource;
///
/// let raw = SvgSource::from_svg("<svg>...</svg>");
/// let file = SvgSource::from_path("assets/stripe.svg");
///
/// // From emoji (requires `twemoji` feature)
/// #[cfg(feature = "twemoji")]
/// let emoji = SvgSource::from_emoji("🏁").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvgSource {
    /// Raw SVG markup string.
    Raw(String),

    /// An SVG file on disk, read when the graphic is loaded.
    File(PathBuf),

    /// An emoji character to be resolved via twemoji_assets.
    ///
    /// Only resolvable when the `twemoji` feature is enabled.
    Emoji(String),
}

impl SvgSource {
    /// Creates a source from raw SVG markup.
    pub fn from_svg(svg: impl Into<String>) -> Self {
        Self::Raw(svg.into())
    }

    /// Creates a source from an SVG file path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Creates a source from an emoji character.
    ///
    /// Returns `None` if the emoji is not supported by twemoji_assets.
    #[cfg(feature = "twemoji")]
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        use twemoji_assets::svg::SvgTwemojiAsset;

        SvgTwemojiAsset::from_emoji(emoji)?;
        Some(Self::Emoji(emoji.to_string()))
    }

    /// Resolves this source to SVG markup.
    pub fn resolve(&self) -> Result<Cow<'_, str>, EditorError> {
        match self {
            Self::Raw(svg) => Ok(Cow::Borrowed(svg.as_str())),
            Self::File(path) => Ok(Cow::Owned(std::fs::read_to_string(path)?)),
            #[cfg(feature = "twemoji")]
            Self::Emoji(emoji) => {
                use twemoji_assets::svg::SvgTwemojiAsset;
                let asset = SvgTwemojiAsset::from_emoji(emoji)
                    .ok_or_else(|| EditorError::UnresolvedSource(emoji.clone()))?;
                Ok(Cow::Borrowed(asset.as_ref()))
            }
            #[cfg(not(feature = "twemoji"))]
            Self::Emoji(emoji) => Err(EditorError::UnresolvedSource(format!(
                "{emoji} (twemoji feature disabled)"
            ))),
        }
    }

    /// Short human readable label for diagnostics.
    pub fn label(&self) -> String {
        match self {
            Self::Raw(svg) => format!("inline svg ({} bytes)", svg.len()),
            Self::File(path) => path.display().to_string(),
            Self::Emoji(emoji) => format!("emoji {emoji}"),
        }
    }
}

impl From<&str> for SvgSource {
    fn from(s: &str) -> Self {
        Self::Raw(s.to_string())
    }
}

impl From<String> for SvgSource {
    fn from(s: String) -> Self {
        Self::Raw(s)
    }
}

impl From<PathBuf> for SvgSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

// ============================================================================
// Graphic
// ============================================================================

/// A parsed, renderable overlay graphic.
///
/// Cheap to clone; the parsed tree is shared.
#[derive(Clone)]
pub struct Graphic {
    source: SvgSource,
    tree: Arc<Tree>,
}

impl Graphic {
    /// Resolves and parses `source`.
    pub fn load(source: SvgSource) -> Result<Self, EditorError> {
        let tree = {
            let svg = source.resolve()?;
            Tree::from_str(&svg, &Options::default())?
        };
        Ok(Self {
            source,
            tree: Arc::new(tree),
        })
    }

    pub fn source(&self) -> &SvgSource {
        &self.source
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Intrinsic size of the graphic in SVG user units.
    pub fn natural_size(&self) -> (f32, f32) {
        let size = self.tree.size();
        (size.width(), size.height())
    }
}

impl fmt::Debug for Graphic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.natural_size();
        f.debug_struct("Graphic")
            .field("source", &self.source.label())
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

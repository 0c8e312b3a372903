//! Decode, analyze, flatten and re-encode, falling back to the input.
//!
//! The pipeline is a pure function of `(bytes, media_type)`:
//!
//! ```text
//! Start ──not PNG──────────────────────────────► PassThrough
//!   │
//!   ▼ decode ──error──────────────────────────► PassThrough
//! Decoded
//!   │
//!   ▼ analyze
//! Analyzed ──transparent_ratio < threshold────► PassThrough
//!   │
//!   ▼ flatten + encode ──error────────────────► PassThrough
//! Flattened ─────────────────────────────────► image/png
//! ```
//!
//! Every pass-through returns the caller's original bytes and media type.

use std::borrow::Cow;
use std::fmt;

use log::{debug, warn};

use crate::analyze::{analyze, Analysis};
use crate::color::Rgb;
use crate::composite::{flatten, FlattenConfig};
use crate::error::Error;
use crate::png::{decode, encode_with_options, PngOptions};

/// Media type of flattened output.
pub const PNG_MEDIA_TYPE: &str = "image/png";

/// Returns true if a declared media type names PNG.
///
/// Parameters after `;` are ignored and the comparison is case-insensitive.
/// The legacy `image/x-png` alias is accepted.
pub fn is_png_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case(PNG_MEDIA_TYPE) || essence.eq_ignore_ascii_case("image/x-png")
}

/// When and how to flatten.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenPolicy {
    /// Minimum transparent ratio that triggers a flatten (inclusive).
    pub threshold: f64,
    /// Images with average luma below this get the light background.
    pub luma_cutoff: f64,
    /// Background for dark content.
    pub light: Rgb,
    /// Background for light content.
    pub dark: Rgb,
    /// Image size relative to the canvas; 1 is full bleed.
    pub scale: f64,
    /// Center the image when `scale < 1`.
    pub center: bool,
    /// Options for re-encoding flattened output.
    pub png: PngOptions,
}

impl Default for FlattenPolicy {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            luma_cutoff: 128.0,
            light: Rgb::WHITE,
            dark: Rgb::new(0x1E, 0x1E, 0x1E),
            scale: 1.0,
            center: true,
            png: PngOptions::default(),
        }
    }
}

impl FlattenPolicy {
    /// Start from the default policy.
    pub fn builder() -> FlattenPolicyBuilder {
        FlattenPolicyBuilder::default()
    }

    /// Whether an analysis crosses the flatten threshold.
    pub fn should_flatten(&self, analysis: &Analysis) -> bool {
        analysis.transparent_ratio >= self.threshold
    }

    /// Pick a background that contrasts with the image content.
    pub fn background_for(&self, analysis: &Analysis) -> Rgb {
        if analysis.avg_luma < self.luma_cutoff {
            self.light
        } else {
            self.dark
        }
    }

    /// Build the per-image compositor settings.
    pub fn flatten_config(&self, analysis: &Analysis) -> FlattenConfig {
        FlattenConfig {
            background: self.background_for(analysis),
            scale: self.scale,
            center: self.center,
        }
    }
}

/// Builder for [`FlattenPolicy`].
#[derive(Debug, Clone, Default)]
pub struct FlattenPolicyBuilder {
    policy: FlattenPolicy,
}

impl FlattenPolicyBuilder {
    /// Set the transparent-ratio threshold.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.policy.threshold = threshold;
        self
    }

    /// Set the luma cutoff between light and dark backgrounds.
    pub fn luma_cutoff(mut self, cutoff: f64) -> Self {
        self.policy.luma_cutoff = cutoff;
        self
    }

    /// Set the background used behind dark content.
    pub fn light(mut self, color: Rgb) -> Self {
        self.policy.light = color;
        self
    }

    /// Set the background used behind light content.
    pub fn dark(mut self, color: Rgb) -> Self {
        self.policy.dark = color;
        self
    }

    /// Shrink the image onto the canvas.
    pub fn scale(mut self, scale: f64) -> Self {
        self.policy.scale = scale;
        self
    }

    /// Center a shrunk image.
    pub fn center(mut self, center: bool) -> Self {
        self.policy.center = center;
        self
    }

    /// Encoder options for flattened output.
    pub fn png_options(mut self, options: PngOptions) -> Self {
        self.policy.png = options;
        self
    }

    /// Finish the policy.
    pub fn build(self) -> FlattenPolicy {
        self.policy
    }
}

/// Why an input was returned unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum PassReason {
    /// Declared media type is not PNG.
    NotPng,
    /// The input could not be decoded.
    DecodeFailed(Error),
    /// Too little of the image is transparent.
    BelowThreshold(Analysis),
    /// Compositing or re-encoding failed.
    EncodeFailed(Error),
}

impl fmt::Display for PassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassReason::NotPng => write!(f, "not a PNG media type"),
            PassReason::DecodeFailed(e) => write!(f, "decode failed: {e}"),
            PassReason::BelowThreshold(a) => write!(
                f,
                "transparent ratio {:.3} below threshold",
                a.transparent_ratio
            ),
            PassReason::EncodeFailed(e) => write!(f, "encode failed: {e}"),
        }
    }
}

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Original bytes returned.
    PassThrough(PassReason),
    /// Image composited and re-encoded.
    Flattened(Analysis),
}

/// Pipeline output.
#[derive(Debug, Clone, PartialEq)]
pub struct Processed<'a> {
    /// Output bytes; borrowed from the input on pass-through.
    pub bytes: Cow<'a, [u8]>,
    /// Output media type; the declared one on pass-through.
    pub media_type: Cow<'a, str>,
    /// What happened.
    pub outcome: Outcome,
}

impl Processed<'_> {
    /// Whether the image was flattened.
    pub fn is_flattened(&self) -> bool {
        matches!(self.outcome, Outcome::Flattened(_))
    }

    /// Detach from the input buffers.
    pub fn into_owned(self) -> (Vec<u8>, String) {
        (self.bytes.into_owned(), self.media_type.into_owned())
    }
}

/// Notification sent to an [`Observer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    /// Input returned unchanged.
    PassThrough {
        /// Why.
        reason: &'a PassReason,
    },
    /// Input flattened.
    Flattened {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
        /// Analysis that triggered the flatten.
        analysis: Analysis,
        /// Background chosen.
        background: Rgb,
    },
}

/// Receives pipeline events, e.g. to report failures. Cannot affect output.
pub trait Observer: Send + Sync {
    /// Called once per run.
    fn observe(&self, event: &Event<'_>);
}

impl<F> Observer for F
where
    F: Fn(&Event<'_>) + Send + Sync,
{
    fn observe(&self, event: &Event<'_>) {
        self(event)
    }
}

/// Flattening pipeline with a fixed policy.
#[derive(Default)]
pub struct Pipeline {
    policy: FlattenPolicy,
    observer: Option<Box<dyn Observer>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("policy", &self.policy)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline with the given policy.
    pub fn new(policy: FlattenPolicy) -> Self {
        Self {
            policy,
            observer: None,
        }
    }

    /// Attach an observer.
    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// The active policy.
    pub fn policy(&self) -> &FlattenPolicy {
        &self.policy
    }

    /// Run one input through the pipeline. Never fails.
    pub fn run<'a>(&self, bytes: &'a [u8], media_type: &'a str) -> Processed<'a> {
        match self.transform(bytes, media_type) {
            Ok((png, analysis)) => Processed {
                bytes: Cow::Owned(png),
                media_type: Cow::Borrowed(PNG_MEDIA_TYPE),
                outcome: Outcome::Flattened(analysis),
            },
            Err(reason) => {
                match &reason {
                    PassReason::DecodeFailed(e) | PassReason::EncodeFailed(e)
                        if !e.is_decode_failure() =>
                    {
                        warn!("flatten failed, passing through: {e}")
                    }
                    other => debug!("passing through {media_type}: {other}"),
                }
                self.notify(&Event::PassThrough { reason: &reason });
                Processed {
                    bytes: Cow::Borrowed(bytes),
                    media_type: Cow::Borrowed(media_type),
                    outcome: Outcome::PassThrough(reason),
                }
            }
        }
    }

    fn transform(&self, bytes: &[u8], media_type: &str) -> Result<(Vec<u8>, Analysis), PassReason> {
        if !is_png_media_type(media_type) {
            return Err(PassReason::NotPng);
        }

        let image = decode(bytes).map_err(PassReason::DecodeFailed)?;
        let (width, height) = (image.width(), image.height());

        let analysis = analyze(&image.pixels);
        if !self.policy.should_flatten(&analysis) {
            return Err(PassReason::BelowThreshold(analysis));
        }

        let config = self.policy.flatten_config(&analysis);
        let png = flatten(&image.pixels, width, height, &config)
            .and_then(|pixels| encode_with_options(&pixels, width, height, &self.policy.png))
            .map_err(PassReason::EncodeFailed)?;

        debug!(
            "flattened {width}x{height} onto {} (transparent {:.3}, luma {:.1})",
            config.background, analysis.transparent_ratio, analysis.avg_luma
        );
        self.notify(&Event::Flattened {
            width,
            height,
            analysis,
            background: config.background,
        });
        Ok((png, analysis))
    }

    fn notify(&self, event: &Event<'_>) {
        if let Some(observer) = &self.observer {
            observer.observe(event);
        }
    }
}

/// Flatten `bytes` with the default policy.
///
/// Returns the output bytes and media type; on any failure these are the
/// inputs unchanged.
pub fn process(bytes: &[u8], media_type: &str) -> (Vec<u8>, String) {
    Pipeline::default().run(bytes, media_type).into_owned()
}

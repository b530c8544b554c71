use bytes::Bytes;
use futures::future::join_all;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::services::codec::{CodecError, EncodedVariant, SourceInfo, VariantCodec};
use crate::services::variant_set::VariantClass;

type ProfileOutcome = (Profile, Result<EncodedVariant, CodecError>);

/// One derived size: bounding box and encoder quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub class: VariantClass,
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
}

impl Profile {
    fn run(self, codec: &dyn VariantCodec, source: &[u8]) -> Result<EncodedVariant, CodecError> {
        codec.derive(source, self.max_width, self.max_height, self.quality)
    }
}

pub const PROFILES: [Profile; 3] = [
    Profile {
        class: VariantClass::Thumb,
        max_width: 300,
        max_height: 300,
        quality: 85,
    },
    Profile {
        class: VariantClass::Medium,
        max_width: 1200,
        max_height: 1200,
        quality: 85,
    },
    Profile {
        class: VariantClass::Original,
        max_width: 2400,
        max_height: 2400,
        quality: 85,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationMode {
    /// One blocking task per profile, joined together
    Parallel,
    /// A single blocking task running the profiles in order
    Sequential,
}

impl FromStr for DerivationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "parallel" => Ok(Self::Parallel),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!("unknown derivation mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DerivedVariant {
    pub profile: Profile,
    pub encoded: EncodedVariant,
}

/// A complete set of derived variants, one per profile, all in the source's
/// format. Only ever constructed when every profile succeeded.
#[derive(Debug, Clone)]
pub struct DerivedSet {
    pub source: SourceInfo,
    pub variants: Vec<DerivedVariant>,
}

impl DerivedSet {
    pub fn extension(&self) -> &'static str {
        self.source.kind.extension()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFailure {
    pub class: VariantClass,
    pub error: CodecError,
}

impl fmt::Display for ProfileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to create {} ({} stage): {}",
            self.class,
            self.error.stage(),
            self.error
        )
    }
}

#[derive(Debug, Error)]
pub enum DerivationError {
    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("{} of the image variants could not be derived", .failures.len())]
    Failed { failures: Vec<ProfileFailure> },
}

#[derive(Clone)]
pub struct DerivationPipeline {
    codec: Arc<dyn VariantCodec>,
    profiles: Vec<Profile>,
    mode: DerivationMode,
}

impl DerivationPipeline {
    pub fn new(codec: Arc<dyn VariantCodec>, mode: DerivationMode) -> Self {
        Self {
            codec,
            profiles: PROFILES.to_vec(),
            mode,
        }
    }

    /// Derives every profile from `source`. All-or-nothing: if any profile
    /// fails, the buffers produced by the others are dropped and every
    /// failure is reported.
    pub async fn derive_all(&self, source: Bytes) -> Result<DerivedSet, DerivationError> {
        let info = self
            .codec
            .probe(&source)
            .map_err(|e| DerivationError::UnsupportedFormat(e.to_string()))?;

        debug!(
            "Deriving {} variants from {} {}x{} ({:?})",
            self.profiles.len(),
            info.kind,
            info.width,
            info.height,
            self.mode
        );

        let outcomes = match self.mode {
            DerivationMode::Parallel => self.run_parallel(source).await,
            DerivationMode::Sequential => self.run_sequential(source).await,
        };

        Self::collect(info, outcomes)
    }

    async fn run_parallel(&self, source: Bytes) -> Vec<ProfileOutcome> {
        let jobs = self.profiles.iter().copied().map(|profile| {
            let codec = self.codec.clone();
            let source = source.clone();
            async move {
                let result =
                    tokio::task::spawn_blocking(move || profile.run(codec.as_ref(), &source))
                        .await
                        .unwrap_or_else(|e| Err(CodecError::Worker(e.to_string())));
                (profile, result)
            }
        });
        join_all(jobs).await
    }

    async fn run_sequential(&self, source: Bytes) -> Vec<ProfileOutcome> {
        let codec = self.codec.clone();
        let profiles = self.profiles.clone();

        tokio::task::spawn_blocking(move || {
            profiles
                .into_iter()
                .map(|profile| (profile, profile.run(codec.as_ref(), &source)))
                .collect::<Vec<_>>()
        })
        .await
        .unwrap_or_else(|e| {
            self.profiles
                .iter()
                .map(|profile| (*profile, Err(CodecError::Worker(e.to_string()))))
                .collect()
        })
    }

    fn collect(
        info: SourceInfo,
        outcomes: Vec<ProfileOutcome>,
    ) -> Result<DerivedSet, DerivationError> {
        let mut variants = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();

        for (profile, result) in outcomes {
            match result {
                Ok(encoded) if encoded.kind == info.kind => {
                    variants.push(DerivedVariant { profile, encoded })
                }
                Ok(encoded) => failures.push(ProfileFailure {
                    class: profile.class,
                    error: CodecError::Encode {
                        format: encoded.kind,
                        reason: format!("expected {} output", info.kind),
                    },
                }),
                Err(error) => failures.push(ProfileFailure {
                    class: profile.class,
                    error,
                }),
            }
        }

        if !failures.is_empty() {
            warn!(
                "Discarding {} derived variant(s) after {} profile failure(s)",
                variants.len(),
                failures.len()
            );
            return Err(DerivationError::Failed { failures });
        }

        Ok(DerivedSet {
            source: info,
            variants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::codec::{ImageCodec, ImageKind};
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;

    struct FailOnWidth {
        width: u32,
    }

    impl VariantCodec for FailOnWidth {
        fn probe(&self, source: &[u8]) -> Result<SourceInfo, CodecError> {
            ImageCodec.probe(source)
        }

        fn derive(
            &self,
            source: &[u8],
            max_width: u32,
            max_height: u32,
            quality: u8,
        ) -> Result<EncodedVariant, CodecError> {
            if max_width == self.width {
                return Err(CodecError::Encode {
                    format: ImageKind::Png,
                    reason: "encoder rejected buffer".to_string(),
                });
            }
            ImageCodec.derive(source, max_width, max_height, quality)
        }
    }

    fn sample_png(width: u32, height: u32) -> Bytes {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 64])
        }));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        Bytes::from(out)
    }

    #[tokio::test]
    async fn test_derive_all_produces_one_variant_per_profile() {
        for mode in [DerivationMode::Parallel, DerivationMode::Sequential] {
            let pipeline = DerivationPipeline::new(Arc::new(ImageCodec), mode);
            let set = pipeline.derive_all(sample_png(1600, 1200)).await.unwrap();

            assert_eq!(set.source.kind, ImageKind::Png);
            assert_eq!(set.extension(), "png");
            let dims: Vec<(VariantClass, u32, u32)> = set
                .variants
                .iter()
                .map(|v| (v.profile.class, v.encoded.width, v.encoded.height))
                .collect();
            assert_eq!(
                dims,
                vec![
                    (VariantClass::Thumb, 300, 225),
                    (VariantClass::Medium, 1200, 900),
                    (VariantClass::Original, 1600, 1200),
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_derive_all_rejects_unsupported_input_before_any_profile() {
        let pipeline = DerivationPipeline::new(Arc::new(ImageCodec), DerivationMode::Parallel);
        let err = pipeline
            .derive_all(Bytes::from_static(b"GIF? no, plain text"))
            .await
            .unwrap_err();
        assert!(matches!(err, DerivationError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_single_profile_failure_discards_the_whole_set() {
        for mode in [DerivationMode::Parallel, DerivationMode::Sequential] {
            let pipeline = DerivationPipeline::new(Arc::new(FailOnWidth { width: 1200 }), mode);
            let err = pipeline.derive_all(sample_png(400, 300)).await.unwrap_err();

            match err {
                DerivationError::Failed { failures } => {
                    assert_eq!(failures.len(), 1);
                    assert_eq!(failures[0].class, VariantClass::Medium);
                    assert!(failures[0].to_string().contains("encode stage"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_truncated_body_fails_every_profile() {
        let full = sample_png(400, 300);
        // Header intact, pixel data cut off
        let truncated = full.slice(..full.len() / 2);
        let pipeline = DerivationPipeline::new(Arc::new(ImageCodec), DerivationMode::Parallel);

        match pipeline.derive_all(truncated).await {
            Err(DerivationError::Failed { failures }) => {
                assert_eq!(failures.len(), 3);
                assert!(
                    failures
                        .iter()
                        .all(|f| f.error.stage() == crate::services::codec::CodecStage::Decode)
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_derivation_mode_parsing() {
        assert_eq!("parallel".parse(), Ok(DerivationMode::Parallel));
        assert_eq!(" Sequential ".parse(), Ok(DerivationMode::Sequential));
        assert!("eventually".parse::<DerivationMode>().is_err());
    }
}

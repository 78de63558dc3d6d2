#![warn(missing_docs)]
//! Movie creation from rendered frame files.
//!
//! [`MovieEncoder`] is a façade over the external encoders known to
//! [`encoder::Encoder`]: it collects the frame files (explicit list, glob
//! pattern or printf-style template), converts them into the frame format the
//! selected encoder consumes, composes the full argument vector and spawns
//! the encoder. Frames are staged in a temporary directory that is removed
//! again whether the run succeeds or fails.
//!
//! Frame conversion shells out to ImageMagick's `convert`, falling back to
//! Netpbm's `anytopnm`; a frame that fails to convert is logged and skipped.

pub mod encoder;

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{info, warn};
use tempfile::TempDir;

use crate::config::Config;
use crate::error::{UniResult, UniplotError};
use crate::movie::encoder::{find_program, CommandPlan, Encoder};

/// All tunable parameters of one encoding run.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieOptions {
    /// output file; `None` selects the encoder's default name
    pub output_file: Option<PathBuf>,
    /// encoder to use; `None` selects the first installed one
    pub encoder: Option<Encoder>,
    /// frames per second
    pub fps: u32,
    /// video bitrate in kbit/s
    pub vbitrate: Option<u32>,
    /// video buffer size
    pub vbuffer: Option<u32>,
    /// codec name for the codec-selecting encoders
    pub vcodec: String,
    /// fixed quantization scale (1 best, 31 worst)
    pub qscale: Option<u32>,
    /// quantization scale for I frames
    pub iqscale: Option<u32>,
    /// quantization scale for P frames
    pub pqscale: Option<u32>,
    /// quantization scale for B frames
    pub bqscale: Option<u32>,
    /// minimum quantization scale
    pub qmin: Option<u32>,
    /// maximum quantization scale
    pub qmax: Option<u32>,
    /// output frame size in pixels
    pub size: Option<(u32, u32)>,
    /// aspect ratio name (`1:1`, `4:3`, `16:9`, `2.21:1`)
    pub aspect: Option<String>,
    /// frames per group of pictures
    pub gop_size: Option<u32>,
    /// I/P/B frame pattern of the MPEG-1 encoder
    pub pattern: String,
    /// replace an existing output file instead of refusing
    pub overwrite_output: bool,
}

impl Default for MovieOptions {
    fn default() -> Self {
        Self {
            output_file: None,
            encoder: None,
            fps: 25,
            vbitrate: None,
            vbuffer: None,
            vcodec: "mpeg4".to_owned(),
            qscale: None,
            iqscale: None,
            pqscale: None,
            bqscale: None,
            qmin: None,
            qmax: None,
            size: None,
            aspect: None,
            gop_size: None,
            pattern: "IBBPBBPBBPBBPBB".to_owned(),
            overwrite_output: false,
        }
    }
}

impl MovieOptions {
    /// Options seeded from the `[movie]` section of the layered config.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut options = Self::default();
        if let Ok(name) = config.get_str("movie", "encoder") {
            if !name.is_empty() {
                match name.parse() {
                    Ok(encoder) => options.encoder = Some(encoder),
                    Err(_) => warn!("config names unknown movie encoder {name}, ignored"),
                }
            }
        }
        if let Ok(fps) = config.get_int("movie", "fps") {
            if fps > 0 {
                #[allow(clippy::cast_sign_loss)]
                {
                    options.fps = fps as u32;
                }
            }
        }
        if let Ok(overwrite) = config.get_bool("movie", "overwrite_output") {
            options.overwrite_output = overwrite;
        }
        options
    }

    /// Set the output size from a standard preset name.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for an unknown preset.
    pub fn set_size_preset(&mut self, name: &str) -> UniResult<()> {
        self.size = Some(match name {
            "sqcif" => (128, 96),
            "qcif" => (176, 144),
            "cif" => (352, 288),
            "4cif" => (704, 576),
            other => {
                return Err(UniplotError::BadValue(format!(
                    "size preset must be sqcif, qcif, cif or 4cif, got {other}"
                )))
            }
        });
        Ok(())
    }

    /// The per-frame-type quantization scales. An explicit `qscale` overrides
    /// all three; otherwise the Berkeley encoder defaults apply.
    #[must_use]
    pub fn quant_scales(&self) -> (u32, u32, u32) {
        self.qscale.map_or(
            (
                self.iqscale.unwrap_or(8),
                self.pqscale.unwrap_or(10),
                self.bqscale.unwrap_or(25),
            ),
            |qscale| (qscale, qscale, qscale),
        )
    }

    /// Check the option values against one encoder's constraints. Runs before
    /// anything is spawned.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for an illegal value.
    pub fn validate(&self, encoder: Encoder) -> UniResult<()> {
        if self.fps == 0 {
            return Err(UniplotError::BadValue(
                "fps must be positive".into(),
            ));
        }
        if let Some(legal) = encoder.legal_fps() {
            if !legal.contains(&self.fps) {
                return Err(UniplotError::BadValue(format!(
                    "{encoder} supports only {legal:?} frames per second, got {}",
                    self.fps
                )));
            }
        }
        for (name, scale) in [
            ("qscale", self.qscale),
            ("iqscale", self.iqscale),
            ("pqscale", self.pqscale),
            ("bqscale", self.bqscale),
            ("qmin", self.qmin),
            ("qmax", self.qmax),
        ] {
            if let Some(scale) = scale {
                if !(1..=31).contains(&scale) {
                    return Err(UniplotError::BadValue(format!(
                        "{name} must be within 1..=31, got {scale}"
                    )));
                }
            }
        }
        if let (Some(qmin), Some(qmax)) = (self.qmin, self.qmax) {
            if qmin > qmax {
                return Err(UniplotError::BadValue(format!(
                    "qmin {qmin} exceeds qmax {qmax}"
                )));
            }
        }
        if let Some((width, height)) = self.size {
            if width == 0 || height == 0 {
                return Err(UniplotError::BadValue(format!(
                    "frame size must be positive, got {width}x{height}"
                )));
            }
        }
        if let Some(aspect) = &self.aspect {
            encoder.aspect_arg(aspect)?;
        }
        Ok(())
    }
}

/// Match a file name against a glob pattern with `*` and `?`.
fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    fn matches(pattern: &[char], name: &[char]) -> bool {
        match (pattern.first(), name.first()) {
            (None, None) => true,
            (Some('*'), _) => {
                matches(&pattern[1..], name)
                    || (!name.is_empty() && matches(pattern, &name[1..]))
            }
            (Some('?'), Some(_)) => matches(&pattern[1..], &name[1..]),
            (Some(p), Some(n)) if p == n => matches(&pattern[1..], &name[1..]),
            _ => false,
        }
    }
    matches(&pattern, &name)
}

/// Expand a printf-style `%d`/`%0Nd` frame counter in `template`, or `None`
/// when the template has no counter.
fn format_template(template: &str, index: usize) -> Option<String> {
    let start = template.find('%')?;
    let rest = &template[start + 1..];
    let digits_end = rest.find('d')?;
    let width_spec = &rest[..digits_end];
    if !width_spec.is_empty() && !width_spec.starts_with('0') {
        return None;
    }
    let width: usize = width_spec.trim_start_matches('0').parse().unwrap_or(0).max(
        if width_spec.is_empty() { 0 } else { width_spec.len() },
    );
    let counter = format!("{index:0width$}");
    Some(format!(
        "{}{}{}",
        &template[..start],
        counter,
        &rest[digits_end + 1..]
    ))
}

/// The movie-building façade: frame collection, conversion and one encoder
/// run.
#[derive(Debug, Clone)]
pub struct MovieEncoder {
    frames: Vec<PathBuf>,
    options: MovieOptions,
}

impl MovieEncoder {
    /// Build from an explicit, ordered frame list.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for an empty list.
    pub fn from_files<I, P>(paths: I) -> UniResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let frames: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        if frames.is_empty() {
            return Err(UniplotError::BadValue("no frame files given".into()));
        }
        Ok(Self {
            frames,
            options: MovieOptions::default(),
        })
    }

    /// Build from a glob pattern (`frames/tmp_*.png`); matches are sorted by
    /// name.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] when nothing matches.
    pub fn from_glob(pattern: &str) -> UniResult<Self> {
        let path = Path::new(pattern);
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let name_pattern = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                UniplotError::BadValue(format!("glob pattern {pattern} has no file part"))
            })?;
        let mut frames: Vec<PathBuf> = std::fs::read_dir(&dir)
            .map_err(|e| {
                UniplotError::BadValue(format!("cannot read directory {}: {e}", dir.display()))
            })?
            .filter_map(Result::ok)
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| glob_match(name_pattern, name))
            })
            .map(|entry| entry.path())
            .collect();
        frames.sort();
        if frames.is_empty() {
            return Err(UniplotError::BadValue(format!(
                "no frame files match {pattern}"
            )));
        }
        Ok(Self {
            frames,
            options: MovieOptions::default(),
        })
    }

    /// Build from a printf-style template (`frames/tmp_%04d.png`), scanning
    /// the counter upwards from 0 (or 1) until a frame is missing.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for a template without a counter or with no
    /// existing frames.
    pub fn from_template(template: &str) -> UniResult<Self> {
        if format_template(template, 0).is_none() {
            return Err(UniplotError::BadValue(format!(
                "frame template {template} has no %d counter"
            )));
        }
        let mut frames = Vec::new();
        let first = (0..=1).find(|index| {
            format_template(template, *index)
                .is_some_and(|name| Path::new(&name).is_file())
        });
        if let Some(first) = first {
            let mut index = first;
            while let Some(name) = format_template(template, index) {
                let path = PathBuf::from(name);
                if !path.is_file() {
                    break;
                }
                frames.push(path);
                index += 1;
            }
        }
        if frames.is_empty() {
            return Err(UniplotError::BadValue(format!(
                "no frame files match template {template}"
            )));
        }
        Ok(Self {
            frames,
            options: MovieOptions::default(),
        })
    }

    /// The collected frame files, in encoding order.
    #[must_use]
    pub fn frames(&self) -> &[PathBuf] {
        &self.frames
    }

    /// The option set of the coming run.
    #[must_use]
    pub const fn options(&self) -> &MovieOptions {
        &self.options
    }

    /// Mutable option access.
    pub fn options_mut(&mut self) -> &mut MovieOptions {
        &mut self.options
    }

    /// Replace the option set.
    pub fn set_options(&mut self, options: MovieOptions) {
        self.options = options;
    }

    fn refuse_existing(&self, output: &Path) -> UniResult<()> {
        if output.exists() && !self.options.overwrite_output {
            return Err(UniplotError::Encoder(format!(
                "output file {} exists, enable overwrite_output to replace it",
                output.display()
            )));
        }
        Ok(())
    }

    fn resolve_encoder(&self) -> UniResult<Encoder> {
        match self.options.encoder {
            Some(encoder) => {
                if encoder.is_installed() {
                    Ok(encoder)
                } else {
                    Err(UniplotError::Encoder(format!(
                        "requested encoder {encoder} is not installed"
                    )))
                }
            }
            None => Encoder::first_installed().ok_or_else(|| {
                UniplotError::Encoder(
                    "no movie encoder found, install mencoder, ffmpeg, mpeg_encode or mpeg2enc"
                        .into(),
                )
            }),
        }
    }

    /// Stage the frames in `dir` as `frame_%04d.<format>`, converting where
    /// the source format differs. Frames that fail to convert are logged and
    /// skipped.
    fn stage_frames(&self, dir: &Path, format: &str) -> UniResult<Vec<PathBuf>> {
        let converter = find_program(&["convert", "magick"]);
        let netpbm = find_program(&["anytopnm"]);
        let mut staged = Vec::with_capacity(self.frames.len());
        for (index, frame) in self.frames.iter().enumerate() {
            let target = dir.join(format!("frame_{:04}.{format}", staged.len()));
            let source_format = frame
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();
            let result = if source_format == format {
                std::fs::copy(frame, &target)
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            } else if let Some(converter) = &converter {
                run_quiet(Command::new(converter).arg(frame).arg(&target))
            } else if let Some(netpbm) = netpbm.as_ref().filter(|_| format == "ppm") {
                let output = Command::new(netpbm)
                    .arg(frame)
                    .stderr(Stdio::null())
                    .output()
                    .map_err(|e| e.to_string());
                output.and_then(|output| {
                    if output.status.success() {
                        std::fs::write(&target, output.stdout).map_err(|e| e.to_string())
                    } else {
                        Err(format!("anytopnm exited with {}", output.status))
                    }
                })
            } else {
                Err("no image converter found, install ImageMagick or Netpbm".to_owned())
            };
            match result {
                Ok(()) => staged.push(target),
                Err(reason) => {
                    warn!("skipping frame {index} ({}): {reason}", frame.display());
                }
            }
        }
        if staged.is_empty() {
            return Err(UniplotError::Encoder(
                "no frame could be staged for encoding".into(),
            ));
        }
        Ok(staged)
    }

    /// Run the encoder and return the output file path.
    ///
    /// An existing output file is refused before anything is spawned unless
    /// `overwrite_output` is set. The frame staging directory is removed
    /// whether encoding succeeds or fails.
    ///
    /// # Errors
    /// [`UniplotError::Encoder`] when no encoder is installed, the output
    /// exists, no frame survives staging, or the encoder exits with a
    /// failure; the message then carries the attempted command line.
    pub fn encode(&self) -> UniResult<PathBuf> {
        if let Some(output) = &self.options.output_file {
            self.refuse_existing(output)?;
        }
        let encoder = self.resolve_encoder()?;
        let output = self
            .options
            .output_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(encoder.default_output()));
        self.refuse_existing(&output)?;
        self.options.validate(encoder)?;
        let staging = TempDir::new().map_err(|e| {
            UniplotError::Encoder(format!("cannot create staging directory: {e}"))
        })?;
        let format = encoder.frame_format();
        let frames = self.stage_frames(staging.path(), format)?;
        let pattern = format!("frame_%04d.{format}");
        let plan = encoder.build_plan(&self.options, staging.path(), &pattern, &frames, &output)?;
        info!("encoding {} frames: {}", frames.len(), plan.command_line());
        run_plan(&plan)?;
        // staging cleans up on drop
        Ok(output)
    }
}

fn run_quiet(command: &mut Command) -> Result<(), String> {
    command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| e.to_string())
        .and_then(|status| {
            if status.success() {
                Ok(())
            } else {
                Err(format!("exited with {status}"))
            }
        })
}

fn run_plan(plan: &CommandPlan) -> UniResult<()> {
    let failure = |reason: String| {
        UniplotError::Encoder(format!("{reason}, command was: {}", plan.command_line()))
    };
    let mut command = Command::new(&plan.program);
    command.args(&plan.args).stdout(Stdio::null());
    let status = if let Some((feeder, feeder_args)) = &plan.feeder {
        let mut feeding = Command::new(feeder)
            .args(feeder_args)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| failure(format!("cannot spawn {}: {e}", feeder.display())))?;
        let feed_out = feeding
            .stdout
            .take()
            .ok_or_else(|| failure("feeder has no stdout".into()))?;
        let status = command
            .stdin(Stdio::from(feed_out))
            .status()
            .map_err(|e| failure(format!("cannot spawn {}: {e}", plan.program.display())))?;
        let _ = feeding.wait();
        status
    } else {
        command
            .status()
            .map_err(|e| failure(format!("cannot spawn {}: {e}", plan.program.display())))?
    };
    if status.success() {
        Ok(())
    } else {
        Err(failure(format!("encoder exited with {status}")))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn glob_matching() {
        assert!(glob_match("tmp_*.png", "tmp_0001.png"));
        assert!(glob_match("tmp_????.png", "tmp_0001.png"));
        assert!(!glob_match("tmp_????.png", "tmp_001.png"));
        assert!(!glob_match("tmp_*.png", "other_0001.png"));
    }
    #[test]
    fn template_expansion() {
        assert_eq!(
            format_template("frames/tmp_%04d.png", 7).unwrap(),
            "frames/tmp_0007.png"
        );
        assert_eq!(format_template("f_%d.png", 12).unwrap(), "f_12.png");
        assert!(format_template("frames/no_counter.png", 0).is_none());
    }
    #[test]
    fn empty_frame_list_is_rejected() {
        assert_matches!(
            MovieEncoder::from_files(Vec::<PathBuf>::new()),
            Err(UniplotError::BadValue(_))
        );
    }
    #[test]
    fn glob_collects_sorted_frames() {
        let dir = TempDir::new().unwrap();
        for index in [2, 0, 1] {
            std::fs::write(dir.path().join(format!("tmp_{index:04}.png")), b"x").unwrap();
        }
        std::fs::write(dir.path().join("other.txt"), b"x").unwrap();
        let movie =
            MovieEncoder::from_glob(&format!("{}/tmp_*.png", dir.path().display())).unwrap();
        let names: Vec<&str> = movie
            .frames()
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["tmp_0000.png", "tmp_0001.png", "tmp_0002.png"]);
    }
    #[test]
    fn template_collects_consecutive_frames() {
        let dir = TempDir::new().unwrap();
        for index in 1..=3 {
            std::fs::write(dir.path().join(format!("f_{index:02}.png")), b"x").unwrap();
        }
        // a gap ends the scan
        std::fs::write(dir.path().join("f_05.png"), b"x").unwrap();
        let movie =
            MovieEncoder::from_template(&format!("{}/f_%02d.png", dir.path().display()))
                .unwrap();
        assert_eq!(movie.frames().len(), 3);
    }
    #[test]
    fn existing_output_is_refused_before_spawning() {
        let dir = TempDir::new().unwrap();
        let frame = dir.path().join("frame.png");
        std::fs::write(&frame, b"x").unwrap();
        let output = dir.path().join("movie.avi");
        std::fs::write(&output, b"old").unwrap();
        let mut movie = MovieEncoder::from_files(vec![frame]).unwrap();
        movie.options_mut().output_file = Some(output.clone());
        // refusal comes before encoder resolution and staging
        let Err(UniplotError::Encoder(message)) = movie.encode() else {
            panic!("expected the existing output to be refused");
        };
        assert!(message.contains("exists"));
        assert_eq!(std::fs::read(&output).unwrap(), b"old");
    }
    #[test]
    fn size_presets() {
        let mut options = MovieOptions::default();
        options.set_size_preset("qcif").unwrap();
        assert_eq!(options.size, Some((176, 144)));
        options.set_size_preset("4cif").unwrap();
        assert_eq!(options.size, Some((704, 576)));
        assert_matches!(
            options.set_size_preset("hd"),
            Err(UniplotError::BadValue(_))
        );
    }
    #[test]
    fn qscale_overrides_per_frame_scales() {
        let mut options = MovieOptions::default();
        assert_eq!(options.quant_scales(), (8, 10, 25));
        options.iqscale = Some(4);
        assert_eq!(options.quant_scales(), (4, 10, 25));
        options.qscale = Some(2);
        assert_eq!(options.quant_scales(), (2, 2, 2));
    }
    #[test]
    fn validation_rejects_illegal_values() {
        let mut options = MovieOptions::default();
        options.fps = 23;
        assert_matches!(
            options.validate(Encoder::MpegEncode),
            Err(UniplotError::BadValue(_))
        );
        assert_matches!(options.validate(Encoder::Ffmpeg), Ok(()));
        options.fps = 25;
        options.qscale = Some(40);
        assert_matches!(
            options.validate(Encoder::Ffmpeg),
            Err(UniplotError::BadValue(_))
        );
        options.qscale = None;
        options.qmin = Some(10);
        options.qmax = Some(5);
        assert_matches!(
            options.validate(Encoder::Ffmpeg),
            Err(UniplotError::BadValue(_))
        );
    }
}

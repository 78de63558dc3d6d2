#![warn(missing_docs)]
//! Knowledge about the supported external movie encoders.
//!
//! Each [`Encoder`] variant knows its binary names, the frame format it
//! consumes, its legal frame rates and how to compose a complete argument
//! vector for one encoding run. Nothing here spawns a process; the façade in
//! the parent module does that with the [`CommandPlan`] built here.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{UniResult, UniplotError};
use crate::movie::MovieOptions;

/// Locate the first of `names` on `$PATH`.
pub(crate) fn find_program(names: &[&str]) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        for name in names {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// A fully composed encoder invocation: one program with its argument vector,
/// optionally fed on stdin by a second program. Never a shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    /// the encoder binary
    pub program: PathBuf,
    /// its argument vector
    pub args: Vec<String>,
    /// a program whose stdout is piped into the encoder's stdin
    pub feeder: Option<(PathBuf, Vec<String>)>,
}

impl CommandPlan {
    /// Render the plan as a single display line for logs and error messages.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = String::new();
        if let Some((program, args)) = &self.feeder {
            let _ = write!(line, "{} {} | ", program.display(), args.join(" "));
        }
        let _ = write!(line, "{} {}", self.program.display(), self.args.join(" "));
        line
    }
}

/// The supported external encoders, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Encoder {
    /// MPlayer's encoder; consumes image sequences directly
    Mencoder,
    /// the FFmpeg command line tool
    Ffmpeg,
    /// the Berkeley MPEG-1 encoder, driven by a parameter file
    MpegEncode,
    /// the mjpegtools MPEG-2 encoder, fed YUV4MPEG on stdin
    Mpeg2enc,
}

impl Encoder {
    /// Binary names probed on `$PATH`, preferred name first.
    #[must_use]
    pub const fn binary_names(&self) -> &'static [&'static str] {
        match self {
            Self::Mencoder => &["mencoder"],
            Self::Ffmpeg => &["ffmpeg", "avconv"],
            // ppmtompeg is netpbm's rename of the same program
            Self::MpegEncode => &["mpeg_encode", "ppmtompeg"],
            Self::Mpeg2enc => &["mpeg2enc"],
        }
    }

    /// The installed binary for this encoder, if any.
    #[must_use]
    pub fn installed_binary(&self) -> Option<PathBuf> {
        find_program(self.binary_names())
    }

    /// Whether the encoder binary is on `$PATH`. Probing never spawns.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.installed_binary().is_some()
    }

    /// The first installed encoder in preference order.
    #[must_use]
    pub fn first_installed() -> Option<Self> {
        Self::iter().find(Self::is_installed)
    }

    /// Frame image format handed to this encoder.
    #[must_use]
    pub const fn frame_format(&self) -> &'static str {
        match self {
            Self::Mencoder | Self::Ffmpeg => "png",
            Self::MpegEncode | Self::Mpeg2enc => "ppm",
        }
    }

    /// Legal frame rates, or `None` when any positive rate is accepted.
    /// The MPEG-1/2 encoders only speak the standard rates.
    #[must_use]
    pub const fn legal_fps(&self) -> Option<&'static [u32]> {
        match self {
            Self::Mencoder | Self::Ffmpeg => None,
            Self::MpegEncode | Self::Mpeg2enc => Some(&[24, 25, 30, 50, 60]),
        }
    }

    /// Default output file name for this encoder's container format.
    #[must_use]
    pub const fn default_output(&self) -> &'static str {
        match self {
            Self::Mencoder | Self::Ffmpeg => "movie.avi",
            Self::MpegEncode | Self::Mpeg2enc => "movie.mpeg",
        }
    }

    /// Translate an aspect ratio name into this encoder's argument form.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for an aspect outside the MPEG set.
    pub fn aspect_arg(&self, aspect: &str) -> UniResult<String> {
        let index = ["1:1", "4:3", "16:9", "2.21:1"]
            .iter()
            .position(|known| *known == aspect)
            .ok_or_else(|| {
                UniplotError::BadValue(format!(
                    "aspect must be one of 1:1, 4:3, 16:9 or 2.21:1, got {aspect}"
                ))
            })?;
        Ok(match self {
            // mencoder wants the ratio as a float
            Self::Mencoder => ["1.0", "1.3333", "1.7778", "2.21"][index].to_owned(),
            Self::Ffmpeg => aspect.to_owned(),
            // numeric MPEG aspect codes
            Self::MpegEncode | Self::Mpeg2enc => (index + 1).to_string(),
        })
    }

    fn mpeg2enc_fps_code(fps: u32) -> UniResult<u32> {
        match fps {
            24 => Ok(2),
            25 => Ok(3),
            30 => Ok(5),
            50 => Ok(6),
            60 => Ok(8),
            other => Err(UniplotError::BadValue(format!(
                "mpeg2enc supports 24, 25, 30, 50 or 60 frames per second, got {other}"
            ))),
        }
    }

    /// Compose the complete invocation for encoding the numbered frame files
    /// in `frame_dir` into `output`. `pattern` is the printf-style frame name
    /// (`frame_%04d.<ext>`), `frames` the resolved file list in order.
    ///
    /// # Errors
    /// [`UniplotError::Encoder`] when the binary is not installed,
    /// [`UniplotError::BadValue`] for option values the encoder rejects.
    pub fn build_plan(
        &self,
        options: &MovieOptions,
        frame_dir: &Path,
        pattern: &str,
        frames: &[PathBuf],
        output: &Path,
    ) -> UniResult<CommandPlan> {
        let program = self.installed_binary().ok_or_else(|| {
            UniplotError::Encoder(format!("{self} is not installed"))
        })?;
        options.validate(*self)?;
        let fps = options.fps;
        let mut args: Vec<String> = Vec::new();
        let mut feeder = None;
        match self {
            Self::Mencoder => {
                args.push(format!("mf://{}", frame_dir.join("*.png").display()));
                args.push("-mf".into());
                args.push(format!("fps={fps}:type=png"));
                args.push("-ovc".into());
                args.push("lavc".into());
                let mut lavcopts = format!("vcodec={}", options.vcodec);
                if let Some(vbitrate) = options.vbitrate {
                    let _ = write!(lavcopts, ":vbitrate={vbitrate}");
                }
                if let Some(qscale) = options.qscale {
                    let _ = write!(lavcopts, ":vqscale={qscale}");
                }
                if let Some(qmin) = options.qmin {
                    let _ = write!(lavcopts, ":vqmin={qmin}");
                }
                if let Some(qmax) = options.qmax {
                    let _ = write!(lavcopts, ":vqmax={qmax}");
                }
                if let Some(gop) = options.gop_size {
                    let _ = write!(lavcopts, ":keyint={gop}");
                }
                args.push("-lavcopts".into());
                args.push(lavcopts);
                if let Some(aspect) = &options.aspect {
                    args.push("-force-avi-aspect".into());
                    args.push(self.aspect_arg(aspect)?);
                }
                if let Some((width, height)) = options.size {
                    args.push("-vf".into());
                    args.push(format!("scale={width}:{height}"));
                }
                args.push("-o".into());
                args.push(output.display().to_string());
            }
            Self::Ffmpeg => {
                args.push("-r".into());
                args.push(fps.to_string());
                args.push("-i".into());
                args.push(frame_dir.join(pattern).display().to_string());
                args.push("-vcodec".into());
                args.push(options.vcodec.clone());
                if let Some(vbitrate) = options.vbitrate {
                    args.push("-b:v".into());
                    args.push(format!("{vbitrate}k"));
                }
                if let Some(qmin) = options.qmin {
                    args.push("-qmin".into());
                    args.push(qmin.to_string());
                }
                if let Some(qmax) = options.qmax {
                    args.push("-qmax".into());
                    args.push(qmax.to_string());
                }
                if let Some(gop) = options.gop_size {
                    args.push("-g".into());
                    args.push(gop.to_string());
                }
                if let Some((width, height)) = options.size {
                    args.push("-s".into());
                    args.push(format!("{width}x{height}"));
                }
                if let Some(aspect) = &options.aspect {
                    args.push("-aspect".into());
                    args.push(self.aspect_arg(aspect)?);
                }
                // overwrite has been settled before spawning
                args.push("-y".into());
                args.push(output.display().to_string());
            }
            Self::MpegEncode => {
                // driven by a parameter file written next to the frames
                let parameter_file = frame_dir.join("mpeg_encode.par");
                std::fs::write(
                    &parameter_file,
                    self.parameter_file(options, frame_dir, frames, output)?,
                )
                .map_err(|e| {
                    UniplotError::Encoder(format!(
                        "cannot write {}: {e}",
                        parameter_file.display()
                    ))
                })?;
                args.push(parameter_file.display().to_string());
            }
            Self::Mpeg2enc => {
                let ppmtoy4m = find_program(&["ppmtoy4m"]).ok_or_else(|| {
                    UniplotError::Encoder(
                        "mpeg2enc needs ppmtoy4m from mjpegtools to feed frames".into(),
                    )
                })?;
                let feeder_args = vec![
                    "-F".into(),
                    format!("{fps}:1"),
                    frame_dir.join(pattern).display().to_string(),
                ];
                feeder = Some((ppmtoy4m, feeder_args));
                args.push("-f".into());
                args.push("3".into());
                args.push("-F".into());
                args.push(Self::mpeg2enc_fps_code(fps)?.to_string());
                if let Some(vbitrate) = options.vbitrate {
                    args.push("-b".into());
                    args.push(vbitrate.to_string());
                }
                if let Some(vbuffer) = options.vbuffer {
                    args.push("-V".into());
                    args.push(vbuffer.to_string());
                }
                if let Some(qscale) = options.qscale {
                    args.push("-q".into());
                    args.push(qscale.to_string());
                }
                if let Some(aspect) = &options.aspect {
                    args.push("-a".into());
                    args.push(self.aspect_arg(aspect)?);
                }
                args.push("-o".into());
                args.push(output.display().to_string());
            }
        }
        Ok(CommandPlan {
            program,
            args,
            feeder,
        })
    }

    /// The Berkeley encoder's parameter file for one run.
    fn parameter_file(
        &self,
        options: &MovieOptions,
        frame_dir: &Path,
        frames: &[PathBuf],
        output: &Path,
    ) -> UniResult<String> {
        let (iqscale, pqscale, bqscale) = options.quant_scales();
        let mut par = String::new();
        let _ = writeln!(par, "PATTERN          {}", options.pattern);
        let _ = writeln!(par, "OUTPUT           {}", output.display());
        let _ = writeln!(par, "BASE_FILE_FORMAT PNM");
        let _ = writeln!(par, "INPUT_CONVERT    *");
        let _ = writeln!(par, "GOP_SIZE         {}", options.gop_size.unwrap_or(15));
        let _ = writeln!(par, "SLICES_PER_FRAME 1");
        let _ = writeln!(par, "INPUT_DIR        {}", frame_dir.display());
        let _ = writeln!(par, "INPUT");
        for frame in frames {
            let name = frame
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    UniplotError::Encoder(format!(
                        "frame path {} has no printable file name",
                        frame.display()
                    ))
                })?;
            let _ = writeln!(par, "{name}");
        }
        let _ = writeln!(par, "END_INPUT");
        let _ = writeln!(par, "PIXEL            HALF");
        let _ = writeln!(par, "RANGE            10");
        let _ = writeln!(par, "PSEARCH_ALG      LOGARITHMIC");
        let _ = writeln!(par, "BSEARCH_ALG      CROSS2");
        let _ = writeln!(par, "IQSCALE          {iqscale}");
        let _ = writeln!(par, "PQSCALE          {pqscale}");
        let _ = writeln!(par, "BQSCALE          {bqscale}");
        let _ = writeln!(par, "REFERENCE_FRAME  ORIGINAL");
        let _ = writeln!(par, "FRAME_RATE       {}", options.fps);
        if let Some(aspect) = &options.aspect {
            let _ = writeln!(par, "ASPECT_RATIO     {}", self.aspect_arg(aspect)?);
        }
        if let Some(vbitrate) = options.vbitrate {
            let _ = writeln!(par, "BIT_RATE         {}", vbitrate * 1024);
        }
        if let Some(vbuffer) = options.vbuffer {
            let _ = writeln!(par, "BUFFER_SIZE      {}", vbuffer * 16);
        }
        Ok(par)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names_round_trip() {
        assert_eq!(Encoder::Mencoder.to_string(), "mencoder");
        assert_eq!(Encoder::MpegEncode.to_string(), "mpeg_encode");
        assert_eq!("ffmpeg".parse::<Encoder>().unwrap(), Encoder::Ffmpeg);
        assert_eq!("mpeg2enc".parse::<Encoder>().unwrap(), Encoder::Mpeg2enc);
        assert!("quicktime".parse::<Encoder>().is_err());
    }
    #[test]
    fn preference_order() {
        let order: Vec<Encoder> = Encoder::iter().collect();
        assert_eq!(
            order,
            vec![
                Encoder::Mencoder,
                Encoder::Ffmpeg,
                Encoder::MpegEncode,
                Encoder::Mpeg2enc
            ]
        );
    }
    #[test]
    fn mpeg_family_restricts_frame_rates() {
        assert!(Encoder::Ffmpeg.legal_fps().is_none());
        assert_eq!(
            Encoder::MpegEncode.legal_fps(),
            Some(&[24, 25, 30, 50, 60][..])
        );
    }
    #[test]
    fn aspect_translation() {
        assert_eq!(Encoder::Ffmpeg.aspect_arg("16:9").unwrap(), "16:9");
        assert_eq!(Encoder::Mencoder.aspect_arg("4:3").unwrap(), "1.3333");
        assert_eq!(Encoder::Mpeg2enc.aspect_arg("16:9").unwrap(), "3");
        assert!(Encoder::Ffmpeg.aspect_arg("5:4").is_err());
    }
    #[test]
    fn command_line_shows_the_feeder() {
        let plan = CommandPlan {
            program: PathBuf::from("/usr/bin/mpeg2enc"),
            args: vec!["-f".into(), "3".into()],
            feeder: Some((
                PathBuf::from("/usr/bin/ppmtoy4m"),
                vec!["-F".into(), "25:1".into()],
            )),
        };
        assert_eq!(
            plan.command_line(),
            "/usr/bin/ppmtoy4m -F 25:1 | /usr/bin/mpeg2enc -f 3"
        );
    }
    #[test]
    fn parameter_file_lists_frames() {
        let options = MovieOptions::default();
        let par = Encoder::MpegEncode
            .parameter_file(
                &options,
                Path::new("/tmp/frames"),
                &[
                    PathBuf::from("/tmp/frames/frame_0000.ppm"),
                    PathBuf::from("/tmp/frames/frame_0001.ppm"),
                ],
                Path::new("movie.mpeg"),
            )
            .unwrap();
        assert!(par.contains("OUTPUT           movie.mpeg"));
        assert!(par.contains("frame_0000.ppm\nframe_0001.ppm\nEND_INPUT"));
        assert!(par.contains("FRAME_RATE       25"));
    }
}

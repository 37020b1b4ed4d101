//! Load, extract and emit driver

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use meshbake_core::{Error, Scene};
use meshbake_parsers::{DaeDocument, DaeParser, ParseOptions, Parser, PieceSummary};
use tracing::{debug, info, warn};

use crate::emit::{CodeEmitter, Dialect, EmitOptions, Emitter, RustEmitter};
use crate::error::BakeResult;
use crate::extract::{extract_scene, NodeSelector};

/// Everything a bake needs besides the input path
#[derive(Debug, Clone, Default)]
pub struct BakeOptions {
    /// Output dialect and common module
    pub emit: EmitOptions,
    /// Document parsing settings
    pub parse: ParseOptions,
    /// Geometry nodes to extract
    pub selector: NodeSelector,
}

impl BakeOptions {
    pub fn new(dialect: Dialect, selector: NodeSelector) -> Self {
        Self {
            emit: EmitOptions::new(dialect),
            parse: ParseOptions::default(),
            selector,
        }
    }
}

/// One `input:output` pair of a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakeJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl BakeJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

impl FromStr for BakeJob {
    type Err = Error;

    /// Parse `input:output`. A drive prefix such as `C:\` on the input is
    /// kept with the input path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_job(s) {
            Some((input, output)) if !input.is_empty() && !output.is_empty() => Ok(BakeJob::new(input, output)),
            _ => Err(Error::invalid_usage(format!("expected INPUT:OUTPUT, got {:?}", s))),
        }
    }
}

fn split_job(s: &str) -> Option<(&str, &str)> {
    let drive = match s.as_bytes() {
        [letter, b':', b'\\' | b'/', ..] if letter.is_ascii_alphabetic() => 2,
        _ => 0,
    };
    let (input, output) = s[drive..].split_once(':')?;
    Some((&s[..drive + input.len()], output))
}

/// What one bake wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakeReport {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub pieces: usize,
    pub joints: usize,
    pub vertices: usize,
}

impl BakeReport {
    fn new(input: &Path, output: Option<&Path>, scene: &Scene) -> Self {
        Self {
            input: input.to_path_buf(),
            output: output.map(Path::to_path_buf),
            pieces: scene.pieces().len(),
            joints: scene.joints().len(),
            vertices: scene.vertex_count(),
        }
    }
}

/// Conversion driver
#[derive(Debug)]
pub struct Baker {
    options: BakeOptions,
    parser: DaeParser,
    emitter: CodeEmitter,
}

impl Default for Baker {
    fn default() -> Self {
        Self::new(BakeOptions::default())
    }
}

impl Baker {
    pub fn new(options: BakeOptions) -> Self {
        let emitter = CodeEmitter::new(&options.emit);
        Self {
            options,
            parser: DaeParser::new(),
            emitter,
        }
    }

    pub fn options(&self) -> &BakeOptions {
        &self.options
    }

    /// Parse a document from disk
    pub fn load(&self, input: &Path) -> BakeResult<DaeDocument> {
        if !input.exists() {
            return Err(Error::FileNotFound(input.to_path_buf()).into());
        }
        if !self.parser.can_parse(input) {
            warn!(path = %input.display(), "Input does not have a .dae extension; parsing as COLLADA anyway");
        }
        Ok(self.parser.parse_file_with_options(input, &self.options.parse)?)
    }

    /// Load and extract, without writing anything. Scenes whose names
    /// would collide as constants in the configured dialect are rejected.
    pub fn bake(&self, input: &Path) -> BakeResult<Scene> {
        let start = Instant::now();
        let document = self.load(input)?;
        let scene = extract_scene(&document, &self.options.selector)?;
        self.emitter.check_constants(&scene)?;
        info!(
            path = %input.display(),
            pieces = scene.pieces().len(),
            joints = scene.joints().len(),
            vertices = scene.vertex_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Baked scene"
        );
        Ok(scene)
    }

    /// Write an extracted scene in the configured dialect
    pub fn emit(&self, scene: &Scene, out: &mut dyn Write) -> BakeResult<()> {
        self.emitter.check_constants(scene)?;
        self.emitter.write_scene(out, scene)?;
        Ok(())
    }

    /// Bake `input` into any sink
    pub fn bake_to_writer(&self, input: &Path, out: &mut dyn Write) -> BakeResult<BakeReport> {
        let scene = self.bake(input)?;
        self.emit(&scene, out)?;
        Ok(BakeReport::new(input, None, &scene))
    }

    /// Bake `input` into a file. The file is only created once extraction
    /// has succeeded.
    pub fn bake_to_path(&self, input: &Path, output: &Path) -> BakeResult<BakeReport> {
        let scene = self.bake(input)?;
        self.write_scene_file(&scene, output)?;
        Ok(BakeReport::new(input, Some(output), &scene))
    }

    /// Write the shared Rust `Vertex` definition
    pub fn write_common(&self, path: &Path) -> BakeResult<()> {
        let mut out = BufWriter::new(File::create(path)?);
        RustEmitter::default().write_common(&mut out)?;
        debug!(path = %path.display(), "Wrote common definitions");
        Ok(())
    }

    /// Bake several documents into Rust files that share one common module.
    ///
    /// Every input is extracted before anything is written. The module name is
    /// the file stem of `common`; the configured dialect and common module are
    /// overridden for the run.
    pub fn bake_batch(&self, jobs: &[BakeJob], common: &Path) -> BakeResult<Vec<BakeReport>> {
        let module = common
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| Error::invalid_usage(format!("cannot derive a module name from {}", common.display())))?;

        if self.options.emit.dialect != Dialect::Rust {
            warn!(dialect = %self.options.emit.dialect, "Batch mode always writes the rust dialect");
        }

        let batch = Baker::new(BakeOptions {
            emit: EmitOptions::new(Dialect::Rust).with_common_module(module),
            parse: self.options.parse.clone(),
            selector: self.options.selector.clone(),
        });

        let scenes = jobs
            .iter()
            .map(|job| batch.bake(&job.input))
            .collect::<BakeResult<Vec<_>>>()?;

        batch.write_common(common)?;

        let mut reports = Vec::with_capacity(jobs.len());
        for (job, scene) in jobs.iter().zip(&scenes) {
            batch.write_scene_file(scene, &job.output)?;
            reports.push(BakeReport::new(&job.input, Some(&job.output), scene));
        }

        info!(files = reports.len(), common = %common.display(), "Batch complete");
        Ok(reports)
    }

    fn write_scene_file(&self, scene: &Scene, output: &Path) -> BakeResult<()> {
        let mut out = BufWriter::new(File::create(output)?);
        self.emit(scene, &mut out)?;
        debug!(path = %output.display(), "Wrote output");
        Ok(())
    }
}

/// Geometry nodes of a document with their geometry ids and triangle counts.
///
/// Nothing is extracted, so documents that would fail extraction can still be
/// listed.
pub fn list_pieces(input: &Path, options: &ParseOptions) -> BakeResult<Vec<PieceSummary>> {
    let baker = Baker::new(BakeOptions {
        parse: options.clone(),
        ..BakeOptions::default()
    });
    Ok(baker.load(input)?.piece_summaries())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_from_str() {
        let job: BakeJob = "steve.dae:src/steve.rs".parse().unwrap();
        assert_eq!(job, BakeJob::new("steve.dae", "src/steve.rs"));

        assert!("steve.dae".parse::<BakeJob>().unwrap_err().is_usage_error());
        assert!(":out.rs".parse::<BakeJob>().is_err());
        assert!("in.dae:".parse::<BakeJob>().is_err());
    }

    #[test]
    fn test_job_with_drive_letters() {
        let job: BakeJob = r"C:\models\steve.dae:steve.rs".parse().unwrap();
        assert_eq!(job, BakeJob::new(r"C:\models\steve.dae", "steve.rs"));

        let job: BakeJob = r"C:\steve.dae:D:\out\steve.rs".parse().unwrap();
        assert_eq!(job, BakeJob::new(r"C:\steve.dae", r"D:\out\steve.rs"));

        let job: BakeJob = "C:/steve.dae:steve.rs".parse().unwrap();
        assert_eq!(job.input, PathBuf::from("C:/steve.dae"));

        assert!(r"C:\steve.dae".parse::<BakeJob>().is_err());
    }

    #[test]
    fn test_missing_input() {
        let baker = Baker::default();
        let err = baker.bake(Path::new("/nonexistent/scene.dae")).unwrap_err();
        assert!(matches!(err, crate::BakeError::Bake(Error::FileNotFound(_))));
    }

    #[test]
    fn test_default_options() {
        let options = BakeOptions::default();
        assert_eq!(options.emit.dialect, Dialect::Rust);
        assert_eq!(options.selector, NodeSelector::All);
        assert_eq!(options.parse.bone_suffix, "_bone");
    }
}

//! Tests for reading a whole ODB++ job directory
//!
//! Tests cover:
//! - Layer matrix
//! - Profile
//! - Plain, gzipped and ZIP (`.Z`) component files
//! - Netlist
//! - Drill tools
//! - Layer features

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use odbpp::Error;
use odbpp::components::ComponentId;
use odbpp::features::Feature;
use odbpp::job::{DRILL_LAYER, OdbJob};
use odbpp::layers::LayerType;
use odbpp::netlist::NetId;
use odbpp::structures::{HolePlating, Point, Value};
use odbpp::units::Unit;

const MATRIX: &str = "STEP {
    COL=1
    NAME=PCB
}

LAYER {
    ROW=1
    CONTEXT=BOARD
    TYPE=COMPONENT
    NAME=COMP_+_TOP
    POLARITY=POSITIVE
    START_NAME=
    END_NAME=
}

LAYER {
    ROW=2
    CONTEXT=BOARD
    TYPE=SIGNAL
    NAME=TOP
    POLARITY=POSITIVE
    START_NAME=
    END_NAME=
}

LAYER {
    ROW=3
    CONTEXT=BOARD
    TYPE=SIGNAL
    NAME=BOTTOM
    POLARITY=POSITIVE
    START_NAME=
    END_NAME=
}

LAYER {
    ROW=4
    CONTEXT=BOARD
    TYPE=COMPONENT
    NAME=COMP_+_BOT
    POLARITY=POSITIVE
    START_NAME=
    END_NAME=
}

LAYER {
    ROW=5
    CONTEXT=BOARD
    TYPE=DRILL
    NAME=THROUGH_DRILL
    POLARITY=POSITIVE
    START_NAME=TOP
    END_NAME=BOTTOM
}
";

const PROFILE: &str = "UNITS=MM
#
#Units
#
U MM
#
#Layer features
#
S P 0
OB 0 0 I
OS 0 30
OS 50 30
OS 50 0
OS 0 0
OE
SE
";

const TOP_COMPONENTS: &str = "UNITS=MM
#
# CMP 0
CMP 0 10 10 0 N U1 STM32F103
PRP Package 'LQFP48'
TOP 0 9 9 0 N 0 0 1
TOP 1 11 9 0 N 1 0 2
";

const BOTTOM_COMPONENTS: &str = "UNITS=MM
#
# CMP 0
CMP 0 20 5 180 M C7 100nF
TOP 0 19 5 180 M 0 0 1
TOP 1 21 5 180 M 1 0 2
";

const NETLIST: &str = "H optimize N
#
#Nets names
#
$0 GND
$1 +3V3
#
#Netlist points
#
0 0.3 9 9 T e e
1 0.3 11 9 T e e
0 0.2 19 5 D e e
1 0.2 21 5 D e e
0 0.15 30 15 B e c v
";

const TOOLS: &str = "THICKNESS=0
USER_PARAMS=
TOOLS {
    NUM=1
    TYPE=VIA
    TYPE2=STANDARD
    MIN_TOL=0
    MAX_TOL=0
    BIT=
    FINISH_SIZE=12
    DRILL_SIZE=12
}
";

const TOP_FEATURES: &str = "UNITS=MM
#
#Feature symbol names
#
$0 r300
$1 rect600x400
#
#Feature attribute names
#
@0 .smd
#
#Layer features
#
P 9 9 1 P 0 8 0;0
P 11 9 1 P 0 8 90;0
L 9 9 11 9 0 P 0
S P 0
OB 0 0 I
OS 0 1
OS 1 1
OS 0 0
OE
SE
";

/// A scratch job directory, removed on drop.
struct JobDir(PathBuf);

impl JobDir {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("odbpp-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        JobDir(root)
    }

    fn write(&self, relative: &str, contents: &str) {
        let path = self.0.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn write_gz(&self, relative: &str, contents: &str) {
        let path = self.0.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut encoder = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
        encoder.write_all(contents.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    fn write_zip(&self, relative: &str, entries: &[(&str, &str)]) {
        let path = self.0.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut writer = ZipWriter::new(fs::File::create(path).unwrap());
        for (name, contents) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for JobDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn sample_job(name: &str) -> JobDir {
    let dir = JobDir::new(name);
    dir.write("matrix/matrix", MATRIX);
    dir.write("steps/pcb/profile", PROFILE);
    dir.write("steps/pcb/layers/comp_+_top/components", TOP_COMPONENTS);
    dir.write_gz("steps/pcb/layers/comp_+_bot/components.gz", BOTTOM_COMPONENTS);
    dir.write("steps/pcb/netlists/cadnet/netlist", NETLIST);
    dir.write("steps/pcb/layers/through_drill/tools", TOOLS);
    dir.write("steps/pcb/layers/top/features", TOP_FEATURES);
    dir
}

fn p(x: &str, y: &str) -> Point {
    Point::parse(x, y).unwrap()
}

#[test]
fn test_read_layers() {
    let dir = sample_job("layers");
    let job = OdbJob::open(dir.path()).unwrap();
    let layers = job.read_layers().unwrap();

    assert_eq!(layers.len(), 5);
    assert_eq!(layers.by_type(LayerType::Signal).count(), 2);
    assert_eq!(layers.top_components().unwrap().unwrap().name, "comp_+_top");
    assert_eq!(layers.bottom_components().unwrap().unwrap().name, "comp_+_bot");
    assert_eq!(
        layers.by_name("THROUGH_DRILL").unwrap().end.as_deref(),
        Some("bottom")
    );
}

#[test]
fn test_read_profile() {
    let dir = sample_job("profile");
    let profile = OdbJob::open(dir.path()).unwrap().read_profile().unwrap();

    assert_eq!(profile.unit, Unit::Millimeters);
    assert_eq!(profile.surfaces.len(), 1);
    assert_eq!(profile.min(), Some(p("0", "0")));
    assert_eq!(profile.max(), Some(p("50", "30")));
}

#[test]
fn test_read_components_plain_and_gzipped() {
    let dir = sample_job("components");
    let components = OdbJob::open(dir.path()).unwrap().read_components().unwrap();

    assert_eq!(components.len(), 2);
    let u1 = &components.top[&ComponentId::Index(0)];
    assert_eq!(u1.name, Value::Text("U1".to_string()));
    assert_eq!(u1.properties["Package"], "LQFP48");
    assert_eq!(u1.toeprints.len(), 2);

    let c7 = &components.bottom[&ComponentId::Index(0)];
    assert_eq!(c7.name, Value::Text("C7".to_string()));
    assert_eq!(c7.location, p("20", "5"));
}

#[test]
fn test_read_zipped_components_and_features() {
    let dir = JobDir::new("zipped");
    dir.write("matrix/matrix", MATRIX);
    dir.write_zip(
        "steps/pcb/layers/comp_+_top/components.Z",
        &[("components", TOP_COMPONENTS)],
    );
    dir.write_zip("steps/pcb/layers/top/features.Z", &[("features", TOP_FEATURES)]);
    let job = OdbJob::open(dir.path()).unwrap();

    let components = job.read_components().unwrap();
    assert_eq!(components.top.len(), 1);
    assert_eq!(
        components.top[&ComponentId::Index(0)].name,
        Value::Text("U1".to_string())
    );
    assert!(components.bottom.is_empty());

    let features = job.read_layer_features("top").unwrap();
    assert_eq!(features.features.len(), 3);
    assert_eq!(features.surfaces.len(), 1);
}

#[test]
fn test_zip_with_several_entries_is_rejected() {
    let dir = JobDir::new("zipped-twice");
    dir.write("matrix/matrix", MATRIX);
    dir.write_zip(
        "steps/pcb/layers/comp_+_top/components.Z",
        &[("components", TOP_COMPONENTS), ("components.old", TOP_COMPONENTS)],
    );
    let result = OdbJob::open(dir.path()).unwrap().read_components();
    assert!(matches!(result, Err(Error::Structure(_))));
}

#[test]
fn test_missing_component_layer_is_empty() {
    let dir = JobDir::new("no-components");
    dir.write("matrix/matrix", MATRIX);
    let components = OdbJob::open(dir.path()).unwrap().read_components().unwrap();
    assert!(components.is_empty());
}

#[test]
fn test_read_netlist() {
    let dir = sample_job("netlist");
    let netlist = OdbJob::open(dir.path()).unwrap().read_netlist().unwrap();

    assert_eq!(netlist.optimized, Some(false));
    let nets = netlist.by_net();
    assert_eq!(nets.len(), 2);
    let gnd = &nets[&NetId::Name("GND".to_string())];
    assert_eq!(gnd.len(), 3);
    assert!(gnd[2].point_type.is_via);
    assert_eq!(nets[&NetId::Name("+3V3".to_string())].len(), 2);
}

#[test]
fn test_read_drill_tools() {
    let dir = sample_job("tools");
    let tools = OdbJob::open(dir.path())
        .unwrap()
        .read_drill_tools(DRILL_LAYER)
        .unwrap();

    assert_eq!(tools.tools.len(), 1);
    assert_eq!(tools.tools[&1].plating, HolePlating::Via);
    assert_eq!(tools.metadata["THICKNESS"], Value::Integer(0));
}

#[test]
fn test_read_layer_features() {
    let dir = sample_job("features");
    let features = OdbJob::open(dir.path())
        .unwrap()
        .read_layer_features("top")
        .unwrap();

    assert_eq!(features.features.len(), 3);
    assert_eq!(features.surfaces.len(), 1);
    let pads: Vec<_> = features
        .features
        .iter()
        .filter_map(|feature| match feature {
            Feature::Pad(pad) => Some(pad),
            _ => None,
        })
        .collect();
    assert_eq!(pads.len(), 2);
    assert_eq!(features.info.symbol_name(&pads[0].symbol), Some("rect600x400"));
    assert!(features.info.apply(&pads[1].attributes).unwrap().contains_key(".smd"));
}

#[test]
fn test_other_step_is_not_found() {
    let dir = sample_job("step");
    let job = OdbJob::open(dir.path()).unwrap().with_step("panel");
    assert!(job.read_profile().is_err());
}

//! End-to-end tests: CSV table in, JSON-LD zip package out.

use lcia_core::ids::make_uuid;
use lcia_core::schema::Stamp;
use lcia_core::{to_jsonld, LciaError, MethodCatalog, Table, WriterContext};
use serde_json::Value;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

const CSV: &str = "\
Method,Method UUID,Indicator,Indicator UUID,Indicator unit,Context,Flow UUID,Flowable,CAS No,Unit,Characterization Factor
TRACI 2.1,,Global warming,,kg CO2 eq,air,,Carbon dioxide,000124-38-9,kg,1
TRACI 2.1,,Global warming,,kg CO2 eq,air,,Methane,000074-82-8,kg,28
TRACI 2.1,,Global warming,,kg CO2 eq,air,,Methane,000074-82-8,kg,28
TRACI 2.1,,Water depletion,,m3,resource/water,,Water,,m3,1
Custom,,Noise,,Pa,air/urban,,Traffic noise,,dB,0.1
";

const METHODS: &str = r#"
[[method]]
name = "TRACI 2.1"
bib_id = "bare_traci_2011"
detail_note = "Factors from the US EPA TRACI 2.1 tool."
"#;

const BIB: &str = r#"
@article{bare_traci_2011,
  author = {Bare, Jane},
  title = {TRACI 2.0: the tool for the reduction and assessment of chemical and other environmental impacts 2.0},
  journal = {Clean Technologies and Environmental Policy},
  year = {2011},
  volume = {13},
  number = {5},
  pages = {687--696}
}
"#;

fn setup(dir: &Path) -> (Table, WriterContext) {
    let bib = dir.join("lcia.bib");
    fs::write(&bib, BIB).expect("Failed to write bibliography");

    let table = Table::from_reader(CSV.as_bytes()).expect("Failed to read table");
    let catalog = MethodCatalog::from_toml(METHODS, "methods.toml").expect("Bad catalog");
    let context = WriterContext::new("1.1.0")
        .with_stamp(Stamp::new("1.1.0", "2024-05-01T12:00:00Z"))
        .with_catalog(catalog)
        .with_bibliography(bib);
    (table, context)
}

fn read_json(archive: &mut zip::ZipArchive<File>, name: &str) -> Value {
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("{} missing from package", name))
        .read_to_string(&mut content)
        .expect("Failed to read entry");
    serde_json::from_str(&content).expect("Invalid JSON")
}

fn entry_names(archive: &mut zip::ZipArchive<File>) -> Vec<String> {
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn test_package_contents() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (table, context) = setup(dir.path());
    let zip_path = dir.path().join("traci.zip");

    let summary = to_jsonld(&table, &zip_path, context, false).expect("conversion failed");
    assert_eq!(summary.rows, 5);
    assert_eq!(summary.factors, 5);
    assert_eq!(summary.methods, 2);
    assert_eq!(summary.indicators, 3);
    assert_eq!(summary.sources, 1);
    assert_eq!(summary.flows, 4);
    assert_eq!(summary.flows_written, 0);
    assert_eq!(summary.unresolved_units, 1);

    let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
    let names = entry_names(&mut archive);

    // Schema marker first, then indicators, methods, sources; no flows
    assert_eq!(names[0], "olca-schema.json");
    let folders: Vec<&str> = names[1..]
        .iter()
        .map(|n| n.split('/').next().unwrap())
        .collect();
    assert_eq!(
        folders,
        vec![
            "lcia_categories",
            "lcia_categories",
            "lcia_categories",
            "lcia_methods",
            "lcia_methods",
            "sources"
        ]
    );
    assert!(!names.iter().any(|n| n.starts_with("flows/")));

    let gwp_id = make_uuid(&["TRACI 2.1", "Global warming"]);
    let gwp = read_json(&mut archive, &format!("lcia_categories/{}.json", gwp_id));
    assert_eq!(gwp["@type"], "ImpactCategory");
    assert_eq!(gwp["name"], "Global warming");
    assert_eq!(gwp["refUnit"], "kg CO2 eq");
    assert_eq!(gwp["category"], "TRACI 2.1");
    assert_eq!(gwp["direction"], "OUTPUT");
    assert_eq!(gwp["version"], "1.1.0");
    assert_eq!(gwp["lastChange"], "2024-05-01T12:00:00Z");
    assert_eq!(gwp["source"]["@id"], make_uuid(&["bare_traci_2011"]));

    let factors = gwp["impactFactors"].as_array().unwrap();
    assert_eq!(factors.len(), 3);
    assert_eq!(factors[1]["value"], 28.0);
    assert_eq!(factors[1]["flow"]["name"], "Methane");
    assert_eq!(factors[1]["flowProperty"]["name"], "Mass");
    assert_eq!(factors[1]["unit"]["name"], "kg");

    let water_id = make_uuid(&["TRACI 2.1", "Water depletion"]);
    let water = read_json(&mut archive, &format!("lcia_categories/{}.json", water_id));
    assert_eq!(water["direction"], "INPUT");

    let traci = read_json(
        &mut archive,
        &format!("lcia_methods/{}.json", make_uuid(&["TRACI 2.1"])),
    );
    let categories = traci["impactCategories"].as_array().unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0]["@id"], gwp_id);
    assert_eq!(categories[1]["@id"], water_id);
    assert!(traci["description"]
        .as_str()
        .unwrap()
        .contains("US EPA TRACI 2.1"));

    let source = read_json(
        &mut archive,
        &format!("sources/{}.json", make_uuid(&["bare_traci_2011"])),
    );
    assert_eq!(source["name"], "TRACI 2.1");
    assert_eq!(source["year"], 2011);
    assert!(source["textReference"]
        .as_str()
        .unwrap()
        .starts_with("Bare, Jane (2011)."));

    // Unresolved unit: factor has no property or unit
    let noise = read_json(
        &mut archive,
        &format!("lcia_categories/{}.json", make_uuid(&["Custom", "Noise"])),
    );
    let factor = &noise["impactFactors"][0];
    assert!(factor.get("flowProperty").is_none());
    assert!(factor.get("unit").is_none());
    assert_eq!(factor["value"], 0.1);
}

#[test]
fn test_package_with_flows() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (table, context) = setup(dir.path());
    let zip_path = dir.path().join("traci-flows.zip");

    let summary = to_jsonld(&table, &zip_path, context, true).expect("conversion failed");
    assert_eq!(summary.flows_written, 4);

    let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
    let names = entry_names(&mut archive);
    let flows: Vec<&String> = names.iter().filter(|n| n.starts_with("flows/")).collect();
    assert_eq!(flows.len(), 4);
    // Flows come last
    assert!(names[names.len() - 4..].iter().all(|n| n.starts_with("flows/")));

    let methane_id = make_uuid(&["Methane", "air", "kg"]);
    let methane = read_json(&mut archive, &format!("flows/{}.json", methane_id));
    assert_eq!(methane["@type"], "Flow");
    assert_eq!(methane["category"], "Elementary flows/air");
    assert_eq!(methane["cas"], "000074-82-8");
    assert_eq!(methane["flowType"], "ELEMENTARY_FLOW");
    let props = methane["flowProperties"].as_array().unwrap();
    assert_eq!(props.len(), 1);
    assert_eq!(props[0]["conversionFactor"], 1.0);
    assert_eq!(props[0]["isRefFlowProperty"], true);

    let noise_id = make_uuid(&["Traffic noise", "air/urban", "dB"]);
    let noise = read_json(&mut archive, &format!("flows/{}.json", noise_id));
    assert!(noise["flowProperties"].as_array().unwrap().is_empty());
}

#[test]
fn test_ids_stable_across_runs() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut runs = Vec::new();
    for name in ["a.zip", "b.zip"] {
        let (table, context) = setup(dir.path());
        let path = dir.path().join(name);
        to_jsonld(&table, &path, context, true).unwrap();
        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        runs.push(entry_names(&mut archive));
    }
    assert_eq!(runs[0], runs[1]);
}

#[test]
fn test_unwritable_target_is_fatal() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (table, context) = setup(dir.path());
    let result = to_jsonld(&table, dir.path().join("no/such/dir/out.zip"), context, false);
    assert!(matches!(result, Err(LciaError::Io(_))));
}

#[test]
fn test_missing_bibliography_file_is_fatal() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (table, context) = setup(dir.path());
    let context = context.with_bibliography(dir.path().join("missing.bib"));
    let result = to_jsonld(&table, dir.path().join("out.zip"), context, false);
    assert!(result.is_err());
}

#[test]
fn test_failed_conversion_still_finalizes_package() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (_, context) = setup(dir.path());
    let csv = format!("{}TRACI 2.1,,Global warming,,kg CO2 eq,air,,Nitrous oxide,,kg,n/a\n", CSV);
    let table = Table::from_reader(csv.as_bytes()).expect("Failed to read table");
    let zip_path = dir.path().join("broken.zip");

    match to_jsonld(&table, &zip_path, context, false) {
        Err(LciaError::InvalidNumber { row, value, .. }) => {
            assert_eq!(row, 6);
            assert_eq!(value, "n/a");
        }
        other => panic!("expected invalid number, got {:?}", other),
    }

    // The sink was dropped on the error path; the archive is still readable
    let mut archive = zip::ZipArchive::new(File::open(&zip_path).expect("package missing"))
        .expect("package was not finalized");
    assert_eq!(entry_names(&mut archive), vec!["olca-schema.json"]);
}

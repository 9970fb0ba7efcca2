use colbuilder::core::io::pdb::PdbFile;
use colbuilder::core::io::traits::CoordinateFile;
use colbuilder::core::models::crosslink::Terminal;
use colbuilder::engine::config::{CrosslinkConfig, CrosslinkConfigBuilder};
use colbuilder::engine::error::{EngineError, OptimizationError};
use colbuilder::engine::generators::perturbation::PerturbationGenerator;
use colbuilder::engine::progress::ProgressReporter;
use colbuilder::engine::state::OptimizationOutcome;
use colbuilder::optimize_crosslinks;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const TABLE: &str = "\
terminal,type,combination,P1,R1,A1,P2,R2,A2,P3,R3,A31
N,D,L4Y-L5Y,9.A,L4Y,CE,947.B,L5Y,NZ,NONE,NONE,NONE
C,D,L4Y-L5Y,1040.C,L4Y,CE,87.A,L5Y,NZ,NONE,NONE,NONE
";

fn structure(separation: f64) -> String {
    format!(
        "ATOM      1  CE  L4Y A   9       0.000   0.000   0.000  1.00  0.00           C\n\
         ATOM      2  NZ  L5Y B 947    {:>8.3}   0.000   0.000  1.00  0.00           N\n\
         END\n",
        separation
    )
}

fn config(dir: &Path, separation: f64, max_attempts: usize) -> CrosslinkConfig {
    fs::write(dir.join("in.pdb"), structure(separation)).unwrap();
    fs::write(dir.join("crosslinks.csv"), TABLE).unwrap();
    CrosslinkConfigBuilder::new()
        .input_path(dir.join("in.pdb"))
        .output_path(dir.join("out.pdb"))
        .crosslinks_path(dir.join("crosslinks.csv"))
        .terminal(Terminal::N)
        .link_type("D")
        .combination("L4Y-L5Y")
        .max_attempts(max_attempts)
        .build()
        .unwrap()
}

#[test]
fn distant_cross_links_exhaust_the_budget_and_fail() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), 40.0, 2);

    let err = optimize_crosslinks(
        &config,
        |pairs| PerturbationGenerator::new(pairs, 2, 0.1, 3),
        &ProgressReporter::new(),
    )
    .unwrap_err();

    match err {
        EngineError::Optimization(OptimizationError::Failed {
            attempts, history, ..
        }) => {
            assert_eq!(attempts, 2);
            assert_eq!(history.len(), 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join("out.pdb").exists());
}

#[test]
fn moderately_distant_cross_links_are_accepted_with_a_warning() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), 6.0, 2);

    let result = optimize_crosslinks(
        &config,
        |pairs| PerturbationGenerator::new(pairs, 2, 0.1, 3),
        &ProgressReporter::new(),
    )
    .unwrap();

    assert_eq!(result.outcome, OptimizationOutcome::AcceptedWithWarning);
    assert_eq!(result.history.len(), 2);
    let written = PdbFile::read_from_path(dir.path().join("out.pdb")).unwrap();
    assert_eq!(written.len(), result.structure.len());
    for (w, r) in written.atoms.iter().zip(&result.structure.atoms) {
        assert!((w.position - r.position).norm() < 1e-3);
    }
}

#[cfg(unix)]
#[test]
fn external_generator_artifacts_are_removed_after_the_run() {
    use colbuilder::engine::generators::process::ProcessGenerator;

    let dir = tempdir().unwrap();
    let work = dir.path().join("work");
    fs::create_dir(&work).unwrap();
    let config = config(dir.path(), 1.0, 3);
    let script = r#"cp "$INPUT_PDB" t1.pdb && cp "$INPUT_PDB" t2.pdb && printf 't1.pdb\nt2.pdb\n' > generated_pdbs.txt"#;

    let result = optimize_crosslinks(
        &config,
        |_| Ok(ProcessGenerator::new("sh", &work).with_args(["-c", script])),
        &ProgressReporter::new(),
    )
    .unwrap();

    assert_eq!(result.outcome, OptimizationOutcome::Converged);
    assert_eq!(fs::read_dir(&work).unwrap().count(), 0);
}

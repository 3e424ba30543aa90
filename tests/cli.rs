use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const SOURCE: &str = "LOOP: ADD s0, 05\nJUMP LOOP\n";
const TEMPLATE: &str = "ignored\n{begin template}\nrom {name}: {INIT_00}\n";

fn workdir(name: &str) -> PathBuf {
    let dir = std::env::current_dir().unwrap().join(format!("_test_cli_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn picoasm(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_picoasm"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn help_and_version() {
    let dir = workdir("help");
    let out = picoasm(&dir, &["--help"]);
    assert!(out.status.success());
    let help = String::from_utf8_lossy(&out.stdout);
    assert!(help.contains("--vhdl"));
    assert!(help.contains("-V"));

    let out = picoasm(&dir, &["--version"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains(env!("CARGO_PKG_VERSION")));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn writes_every_requested_output() {
    let dir = workdir("all");
    std::fs::write(dir.join("blink.psm"), SOURCE).unwrap();
    std::fs::write(dir.join("rom.tpl"), TEMPLATE).unwrap();

    let out = picoasm(
        &dir,
        &[
            "-i", "blink.psm", "-t", "rom.tpl", "-H", "blink.hex", "-V", "blink.vhd", "-v",
            "blink.v", "-l", "blink.lst", "--symbols", "blink.json",
        ],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let hex = std::fs::read_to_string(dir.join("blink.hex")).unwrap();
    assert_eq!(hex.lines().count(), 1024);
    assert!(hex.starts_with("18005\n34000\n00000\n"));

    let rom = format!("rom blink: {}40008005\n", "0".repeat(56));
    assert_eq!(std::fs::read_to_string(dir.join("blink.vhd")).unwrap(), rom);
    assert_eq!(std::fs::read_to_string(dir.join("blink.v")).unwrap(), rom);

    let listing = std::fs::read_to_string(dir.join("blink.lst")).unwrap();
    assert!(listing.contains("   2  001  34000  JUMP LOOP"));

    let symbols: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("blink.json")).unwrap()).unwrap();
    assert_eq!(symbols["LOOP"]["value"]["kind"], "address");
    assert_eq!(symbols["LOOP"]["value"]["value"], 0);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn module_name_and_default_template() {
    let dir = workdir("name");
    std::fs::write(dir.join("prog.psm"), SOURCE).unwrap();
    std::fs::write(dir.join("ROM_form.vhd"), TEMPLATE).unwrap();

    let out = picoasm(&dir, &["-i", "prog.psm", "-m", "my_rom", "-V", "out.vhd"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let rom = std::fs::read_to_string(dir.join("out.vhd")).unwrap();
    assert!(rom.starts_with("rom my_rom: "));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_template_fails_but_other_outputs_are_written() {
    let dir = workdir("partial");
    std::fs::write(dir.join("prog.psm"), SOURCE).unwrap();

    let out = picoasm(
        &dir,
        &["-i", "prog.psm", "-V", "prog.vhd", "-H", "prog.hex", "-l", "prog.lst"],
    );
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("ROM_form.vhd"));
    assert!(!dir.join("prog.vhd").exists());
    assert!(dir.join("prog.hex").exists());
    assert!(dir.join("prog.lst").exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn assembly_errors_set_exit_code_and_write_nothing() {
    let dir = workdir("errors");
    std::fs::write(dir.join("bad.psm"), "ADD s0, s99\nJUMP nowhere\n").unwrap();

    let out = picoasm(&dir, &["-i", "bad.psm", "-H", "bad.hex", "--diagnostics", "json"]);
    assert!(!out.status.success());
    assert!(!dir.join("bad.hex").exists());

    let diags: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(diags.as_array().map(Vec::len), Some(2));
    assert_eq!(diags[0]["kind"], "OperandRange");
    assert_eq!(diags[1]["line"], 2);

    let out = picoasm(&dir, &["-i", "bad.psm"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("bad.psm:line 2: undefined label `nowhere`"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn target_file_narrows_program_memory() {
    let dir = workdir("target");
    std::fs::write(dir.join("prog.psm"), SOURCE).unwrap();
    std::fs::write(dir.join("small.json"), r#"{ "program_words": 16 }"#).unwrap();

    let out = picoasm(&dir, &["-i", "prog.psm", "--target", "small.json", "-H", "prog.hex"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let hex = std::fs::read_to_string(dir.join("prog.hex")).unwrap();
    assert_eq!(hex.lines().count(), 16);

    std::fs::write(dir.join("huge.json"), r#"{ "scratchpad_bytes": 256 }"#).unwrap();
    let out = picoasm(&dir, &["-i", "prog.psm", "--target", "huge.json"]);
    assert!(!out.status.success());
    let _ = std::fs::remove_dir_all(&dir);
}

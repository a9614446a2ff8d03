use std::fs;
use washi::prelude::*;

/// A stand-in for the real template compiler: the whole source becomes a
/// single escaped print
struct EchoCompiler;

impl TemplateCompiler for EchoCompiler {
    fn compile(&self, _key: &str, source: &str) -> washi::loader::Result<ByteCode> {
        let mut bc = ByteCode::new();
        bc.append_with_arg(Op::Literal, source);
        bc.append(Op::Print);
        bc.append(Op::End);
        Ok(bc)
    }
}

fn settings_for(root: &std::path::Path) -> WashiSettings {
    WashiSettings {
        search_roots: vec![root.to_path_buf()],
        ..Default::default()
    }
}

#[test]
fn renders_a_template_from_disk() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("hello.tx"), "x < y").unwrap();

    let mut washi = Washi::with_settings(settings_for(root.path()), EchoCompiler).unwrap();
    let output = washi.render("hello.tx", &Stash::new()).unwrap();
    assert_eq!(output, "x &lt; y");
}

#[test]
fn a_missing_template_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    let mut washi = Washi::with_settings(settings_for(root.path()), EchoCompiler).unwrap();

    let error = washi.render("absent.tx", &Stash::new()).unwrap_err();
    assert!(error.to_string().contains("absent.tx"));
}

#[test]
fn renders_template_source_directly() {
    let mut washi = Washi::new(EchoCompiler).unwrap();
    let output = washi.render_string("a & b", &Stash::new()).unwrap();
    assert_eq!(output, "a &amp; b");
}

#[test]
fn renders_prebuilt_bytecode_against_variables() {
    let mut washi = Washi::new(EchoCompiler).unwrap();

    let mut bc = ByteCode::new();
    bc.append_with_arg(Op::FetchS, "who");
    bc.append(Op::Print);
    bc.append(Op::End);

    let mut vars = Stash::new();
    vars.set("who", "world");

    let output = washi.render_bytecode(&bc, &vars).unwrap();
    assert_eq!(output, "world");
}

#[test]
fn warnings_from_the_last_render_are_exposed() {
    let mut washi = Washi::new(EchoCompiler).unwrap();

    let mut bc = ByteCode::new();
    bc.append(Op::Nil);
    bc.append(Op::Print);
    bc.append(Op::End);

    washi.render_bytecode(&bc, &Stash::new()).unwrap();
    assert_eq!(washi.warnings(), ["use of nil to print"]);
}

#[test]
fn a_persistent_cache_survives_engine_restarts() {
    let root = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    fs::write(root.path().join("page.tx"), "cached page").unwrap();

    let settings = || WashiSettings {
        search_roots: vec![root.path().to_path_buf()],
        cache_strategy: CacheStrategy::NoVerify,
        cache_dir: Some(cache.path().to_path_buf()),
        ..Default::default()
    };

    let mut first = Washi::with_settings(settings(), EchoCompiler).unwrap();
    assert_eq!(
        first.render("page.tx", &Stash::new()).unwrap(),
        "cached page"
    );

    // A fresh engine finds the persisted bytecode even though the template
    // file is gone.
    fs::remove_file(root.path().join("page.tx")).unwrap();
    let mut second = Washi::with_settings(settings(), EchoCompiler).unwrap();
    assert_eq!(
        second.render("page.tx", &Stash::new()).unwrap(),
        "cached page"
    );
}

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use colored::Colorize;
use manuscript_aom::Aom;
use manuscript_compiler::compile_source;

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Input markup file, or - for stdin
    pub input: PathBuf,
}

fn read_source(args: &InputArgs) -> anyhow::Result<String> {
    if args.input.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("reading stdin")?;
        Ok(source)
    } else {
        std::fs::read_to_string(&args.input)
            .with_context(|| format!("reading {}", args.input.display()))
    }
}

/// Parse and compile, reporting what was found
pub fn check(args: &InputArgs) -> anyhow::Result<()> {
    let source = read_source(args)?;

    let nodes = match manuscript_parser::parse(&source) {
        Ok(nodes) => nodes,
        Err(err) => {
            eprintln!("{} {}", "parse error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let mut aom = Aom::new();
    let article = match manuscript_compiler::compile(&mut aom, &nodes) {
        Ok(article) => article,
        Err(err) => {
            eprintln!("{} {}", "compile error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let meta = aom.article_meta(&article)?;
    println!(
        "{} {} ({} nodes)",
        "ok".green().bold(),
        meta.title.as_deref().unwrap_or("<untitled>"),
        aom.len()
    );
    Ok(())
}

/// Compile, then print the regenerated markup
pub fn tex(args: &InputArgs) -> anyhow::Result<()> {
    let source = read_source(args)?;
    let mut aom = Aom::new();
    let article = compile_source(&mut aom, &source)?;
    println!("{}", aom.tex(&article)?);
    Ok(())
}

/// Compile, then print the serialized tree
pub fn json(args: &InputArgs) -> anyhow::Result<()> {
    let source = read_source(args)?;
    let mut aom = Aom::new();
    let article = compile_source(&mut aom, &source)?;
    let value = aom.serialise(&article)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

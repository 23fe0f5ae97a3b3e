//! Compiler and linker command lines
//!
//! Nothing here spawns a process. The functions build [`Invocation`] values
//! that the [`supervisor`](crate::supervisor) runs.

use crate::context::BuildContext;
use crate::unit::{CompilationUnit, Language, UnitRegistry};
use std::ffi::{OsStr, OsString};
use std::fmt;
use tracing::warn;

/// Warnings and code generation flags passed to every compile
const COMMON_CFLAGS: &[&str] = &[
    "-Wall",
    "-Wmissing-declarations",
    "-Wshadow",
    "-Wpointer-arith",
    "-Wcast-qual",
    "-Wsign-compare",
    "-fPIC",
    "-g",
];

const C_FLAGS: &[&str] = &["-Wstrict-prototypes", "-Wmissing-prototypes"];

const CXX_FLAGS: &[&str] = &["-Woverloaded-virtual", "-Wold-style-cast", "-Wnon-virtual-dtor"];

/// A program and its arguments, ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.arg(arg);
        }
        self
    }

    /// Program name for diagnostics
    pub fn program_lossy(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Arguments as strings, for logs and assertions
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Limit user supplied flags to `max` entries (`0` means no limit)
pub fn cap_flags<'a>(flags: &'a [String], max: usize, what: &str) -> &'a [String] {
    if max == 0 || flags.len() <= max {
        return flags;
    }
    warn!(
        "{} has {} entries, only the first {} are used",
        what,
        flags.len(),
        max
    );
    &flags[..max]
}

/// Command line compiling `unit` into its object file
pub fn compile_invocation(ctx: &BuildContext, unit: &CompilationUnit) -> Invocation {
    let toolchain = ctx.toolchain();
    let mut inv = Invocation::new(&toolchain.compiler);

    inv.arg(include_flag(ctx.src_dir().as_os_str()))
        .arg(include_flag(ctx.includes_dir().as_os_str()))
        .arg(include_flag(toolchain.include_dir().as_os_str()));

    if cfg!(target_os = "macos") {
        inv.args(["-I/opt/local/include", "-I/usr/local/opt/openssl/include"]);
    }

    inv.args(cap_flags(&toolchain.cflags, toolchain.max_extra_flags, "CFLAGS"))
        .args(COMMON_CFLAGS);

    match unit.language {
        Language::Cxx => {
            inv.args(CXX_FLAGS);
            if let Some(std) = &toolchain.cxx_std {
                inv.arg(format!("-std={}", std));
            }
        }
        Language::C => {
            inv.args(C_FLAGS);
        }
    }

    inv.arg("-c")
        .arg(&unit.source)
        .arg("-o")
        .arg(&unit.object);
    inv
}

/// Command line linking every registered object into the shared library
pub fn link_invocation(ctx: &BuildContext, registry: &UnitRegistry) -> Invocation {
    let toolchain = ctx.toolchain();
    let mut inv = Invocation::new(&toolchain.compiler);

    if cfg!(target_os = "macos") {
        inv.args(["-dynamiclib", "-undefined", "suppress", "-flat_namespace"]);
    } else {
        inv.arg("-shared");
    }

    inv.args(registry.objects());

    if registry.has_secondary() {
        inv.arg(format!("-l{}", toolchain.cxx_lib));
    }

    inv.args(cap_flags(&toolchain.ldflags, toolchain.max_extra_flags, "LDFLAGS"))
        .arg("-o")
        .arg(ctx.output_path());
    inv
}

fn include_flag(dir: &OsStr) -> OsString {
    let mut flag = OsString::from("-I");
    flag.push(dir);
    flag
}

//! Shared fixtures for build integration tests

#![allow(dead_code)]

use plugsmith_build::{
    BuildContext, Builder, CommandRunner, Invocation, ProcessStatus, ToolchainConfig,
};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// One call made through the fake runner
#[derive(Debug, Clone)]
pub struct Call {
    pub invocation: Invocation,
    /// Contents of `src/assets.h` at the time of the call
    pub header: Option<String>,
}

impl Call {
    pub fn args(&self) -> Vec<String> {
        self.invocation.args_lossy()
    }

    pub fn is_link(&self) -> bool {
        self.args().iter().any(|a| a == "-shared" || a == "-dynamiclib")
    }

    /// Value following `-o`
    pub fn output(&self) -> Option<PathBuf> {
        let args = self.args();
        let pos = args.iter().position(|a| a == "-o")?;
        args.get(pos + 1).map(PathBuf::from)
    }
}

/// Records invocations and creates their `-o` output instead of compiling
#[derive(Clone)]
pub struct FakeRunner {
    calls: Rc<RefCell<Vec<Call>>>,
    header: PathBuf,
    fail_on: Option<String>,
}

impl FakeRunner {
    pub fn new(root: &Path) -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
            header: root.join("src/assets.h"),
            fail_on: None,
        }
    }

    /// Exit with status 1 for any invocation with an argument ending in `suffix`
    pub fn failing_on(mut self, suffix: &str) -> Self {
        self.fail_on = Some(suffix.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn compiles(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| !c.is_link()).collect()
    }

    pub fn links(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_link).collect()
    }

    pub fn reset(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl CommandRunner for FakeRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<ProcessStatus> {
        let call = Call {
            invocation: invocation.clone(),
            header: fs::read_to_string(&self.header).ok(),
        };
        let output = call.output();
        let fails = self.fail_on.as_ref().is_some_and(|suffix| {
            call.args().iter().any(|a| a.ends_with(suffix.as_str()))
        });
        self.calls.borrow_mut().push(call);

        if fails {
            return Ok(ProcessStatus::exited(1));
        }
        if let Some(output) = output {
            fs::write(output, b"fake object")?;
        }
        Ok(ProcessStatus::exited(0))
    }
}

/// A project named `shop` inside a temp dir
pub struct Project {
    pub temp: TempDir,
    pub root: PathBuf,
}

impl Project {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("shop");
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("conf")).unwrap();
        fs::write(root.join("conf/shop.conf"), "server tls {}\n").unwrap();

        let project = Self { temp, root };
        for (path, content) in files {
            project.write(path, content);
        }
        project
    }

    pub fn write(&self, path: &str, content: &str) {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    pub fn path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    pub fn context(&self) -> BuildContext {
        BuildContext::new(&self.root, ToolchainConfig::default()).unwrap()
    }

    pub fn context_with(&self, toolchain: ToolchainConfig) -> BuildContext {
        BuildContext::new(&self.root, toolchain).unwrap()
    }

    /// Builder wired to a fresh fake runner
    pub fn builder(&self) -> (Builder, FakeRunner) {
        let runner = FakeRunner::new(&self.root);
        let builder = Builder::new(self.context()).with_runner(Box::new(runner.clone()));
        (builder, runner)
    }
}

// An oracle backed by an external program.
//
// The program is run once per query with the hex-encoded candidate
// ciphertext as its final argument. A zero exit status means the padding was
// valid, any other status means it was not. Failing to run the program at
// all is a fault, not an answer.
use std::ffi::OsString;
use std::process::{Command, Stdio};

use tracing::trace;

use crate::oracle::{Oracle, OracleFault, SharedOracle};

#[derive(Clone, Debug)]
pub struct CommandOracle {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandOracle {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn run(&self, ciphertext: &[u8]) -> Result<bool, OracleFault> {
        let candidate = hex::encode(ciphertext);
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&candidate)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(OracleFault::new)?;
        trace!(%candidate, code = ?status.code(), "oracle exited");
        Ok(status.success())
    }
}

impl Oracle for CommandOracle {
    fn query(&mut self, ciphertext: &[u8]) -> Result<bool, OracleFault> {
        self.run(ciphertext)
    }
}

impl SharedOracle for CommandOracle {
    fn query_shared(&self, ciphertext: &[u8]) -> Result<bool, OracleFault> {
        self.run(ciphertext)
    }
}

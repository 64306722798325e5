//! Acquire resources for an operation and release them newest first.
use raises::prelude::*;
use std::io;

struct Connection {
    name: &'static str,
}

impl Resource<io::Error> for Connection {
    fn release(&mut self) -> Result<(), io::Error> {
        println!("closing {}", self.name);
        Ok(())
    }
}

fn main() -> Result<(), io::Error> {
    let scope = ResourceScope::new()
        .acquire(Connection { name: "primary" })
        .acquire(Connection { name: "replica" })
        .defer(|| {
            println!("releasing advisory lock");
            Ok(())
        });

    attempt_with(scope, || {
        println!("copying rows");
        Err(io::Error::new(io::ErrorKind::TimedOut, "replica stalled"))
    })
    .if_raises(io::ErrorKind::TimedOut)
    .or(io::ErrorKind::ConnectionReset)
    .then_call(|e| println!("copy abandoned: {e}"))
    .finally_done(|| println!("copy finished"))
}

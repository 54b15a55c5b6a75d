use pushdown::{Pda, encoding};

fn main() {
    let source = encoding::repair(include_str!("../example.pda"));

    let pda = match Pda::load(&source) {
        Ok(pda) => pda,
        Err(err) => {
            eprintln!("error: {err}");
            return;
        }
    };

    let input = "aab";
    println!("running on: '{input}'");
    match pda.run(input, "", true) {
        Ok(run) => {
            for event in &run.trace {
                println!("{event}");
            }
            println!("{}", if run.accepted { "Accepted" } else { "Rejected" });
        }
        Err(err) => eprintln!("error: {err}"),
    }
}

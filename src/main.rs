extern crate regdfa;

use regdfa::{compile, java_class, Alphabet};

pub fn main() -> anyhow::Result<()> {
    env_logger::init();

    let regex = "L . ( L | D )* . #";
    let compiled = compile(regex, &Alphabet::identifier())?;
    println!("postfix: {}", compiled.postfix);
    print!("{}", compiled.followpos);
    print!("{}", compiled.dfa.table());

    compiled.tree.to_graph().write_dot("tree.dot")?;
    compiled.dfa.to_graph().write_dot("dfa.dot")?;
    compiled
        .minimized
        .to_graph(compiled.dfa.table())
        .write_dot("min_dfa.dot")?;
    std::fs::write("dfa.json", compiled.dfa.to_graph().to_json()?)?;

    for lexeme in &["PotionBrewer", "3x"] {
        println!("{}", compiled.simulate(lexeme, java_class));
    }
    Ok(())
}

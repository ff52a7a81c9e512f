fn main() {
    // Gramar:  S -> S + N | N;  N -> 1 | 2 | 3;
    let grammar = sencha::GrammarBuilder::default()
      .nonterm("S")
      .nonterm("N")
      .terminal("+")
      .terminal("1")
      .terminal("2")
      .terminal("3")
      .rule("S", &["S", "+", "N"])
      .rule("S", &["N"])
      .rule("N", &["1"])
      .rule("N", &["2"])
      .rule("N", &["3"])
      .into_grammar("S")
      .unwrap();

    let recognizer = sencha::EarleyRecognizer::new(&grammar);

    // Recognize some sum and show how it was derived
    let input: Vec<_> = "1 + 2 + 3".split_whitespace().collect();
    println!("accepted: {}", recognizer.recognize(&input));
    println!("steps: {:?}", recognizer.min_derivation_len(&input));
    if let Some(tree) = recognizer.derive("S", &input) {
        print!("{}", tree);
    }

    // First few sentences of the language
    for sentence in recognizer.language().take(10) {
        println!("{}", sentence.join(" "));
    }
}

#[macro_use]
mod cases;

test_case!(integer, input: "42", value: "42");
test_case!(last_expression_wins, input: "1 2 3", value: "3");
test_case!(left_to_right, input: "1 + 2 * 3", value: "9");
test_case!(groups_first, input: "1 + (2 * 3)", value: "7");
test_case!(decimal_result, input: "10 / 4", value: "2.5");
test_case!(exact_decimal_keeps_point, input: "1.5 * 2", value: "3.0");
test_case!(prefix_args_take_infix, input: "add 1 2 * 10", value: "21");

test_case!(set_and_get, input: "x: 10  y: x + 1  y", value: "11");
test_case!(chained_set, input: "a: b: 5  a + b", value: "10");
test_case!(get_word_of_function, input: "f: :add  f 1 2", value: "3");
test_case!(lit_word, input: "'hello", value: "hello");
test_case!(lit_path, input: "'a/b", value: "a/b");
test_case!(block_is_inert, input: "[1 + 2]", value: "[1 + 2]");
test_case!(string_mold, input: "\"say ^\"hi^\"\"", value: "\"say ^\"hi^\"\"");
test_case!(tag, input: "<br>", value: "<br>");

test_case!(block_pick, input: "b: [10 20 30]  b/2", value: "20");
test_case!(block_select, input: "b: [x 1 y 2]  b/y", value: "2");
test_case!(block_pick_past_end, input: "b: [1]  b/5", value: "_");
test_case!(computed_pick, input: "b: [1 2 3]  n: 3  b/:n", value: "3");

test_case!(bar_separates, input: "1 + 2 | 4", value: "4");
test_case!(trailing_bar_is_void, input: "1 |", value: "");
test_case!(punctuator, input: "1 || 2", value: "2");

test_case!(quote_group, input: "quote (1 + 2)", value: "(1 + 2)");
test_case!(eval_retrigger, input: "eval :multiply 6 7", value: "42");
test_case!(eval_inert, input: "eval 5", value: "5");
test_case!(do_block, input: "do [1 + 1]", value: "2");
test_case!(do_string, input: "do \"x: 4  x * x\"", value: "16");

test_case!(no_value, input: "undefined-thing", error: "script/no-value");
test_case!(need_value, input: "x:", error: "script/need-value");
test_case!(missing_arg, input: "add 1", error: "script/no-arg");
test_case!(barrier, input: "add 1 | 2", error: "script/expression-barrier");
test_case!(bad_refinement, input: "add/only 1 2", error: "script/bad-refine");
test_case!(assign_punctuator, input: "x: ||", error: "script/punctuator-hit");
test_case!(set_path_on_block, input: "b: [1]  b/1: 2", error: "script/invalid-path");

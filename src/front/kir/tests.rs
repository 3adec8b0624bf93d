use crate::front::ast::CompUnit;
use crate::front::generate_kir;

fn parse(src: &str) -> CompUnit {
    crate::grammar::CompUnitParser::new()
        .parse(src)
        .expect("source should parse")
}

fn lower(src: &str) -> String {
    generate_kir(&parse(src), None).expect("lowering should succeed")
}

fn lower_err(src: &str) -> String {
    generate_kir(&parse(src), None)
        .expect_err("lowering should fail")
        .to_string()
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

// === 基本形状 ===

#[test]
fn minimal_main() {
    let kir = lower("int main() { return 0; }");
    assert!(kir.starts_with("decl @getint(): i32\n"), "kir:\n{kir}");
    assert!(kir.contains("decl @putint(i32)\n"), "kir:\n{kir}");
    assert!(
        kir.ends_with("fun @main(): i32 {\n%entry:\n  ret 0\n}\n"),
        "kir:\n{kir}"
    );
}

#[test]
fn lowering_is_deterministic() {
    let src = "int g = 3;\nint main() { int x = g; if (x) { x = x + 1; } return x; }";
    assert_eq!(lower(src), lower(src));
}

#[test]
fn missing_return_appends_ret_zero() {
    let kir = lower("int main() { int x = 1; }");
    assert!(kir.ends_with("  ret 0\n}\n"), "kir:\n{kir}");
}

#[test]
fn void_function_gets_bare_ret() {
    let kir = lower("void f() {}\nint main() { f(); return 0; }");
    assert!(kir.contains("fun @f() {\n%entry:\n  ret\n}\n"), "kir:\n{kir}");
    assert!(kir.contains("\n  call @f()\n"), "kir:\n{kir}");
}

// === 常量折叠 ===

#[test]
fn const_decl_folds_away() {
    let kir = lower("const int N = 3 + 4 * 2;\nint main() { return N; }");
    assert!(
        kir.ends_with("fun @main(): i32 {\n%entry:\n  ret 11\n}\n"),
        "kir:\n{kir}"
    );
    assert!(!kir.contains("@N"), "kir:\n{kir}");
}

#[test]
fn folding_is_exhaustive_over_constant_leaves() {
    // 所有叶子都是字面量时不输出任何指令
    let kir = lower("int main() { return (1 + 2 * 3 < 7) == !0; }");
    assert!(kir.ends_with("%entry:\n  ret 0\n}\n"), "kir:\n{kir}");
    assert!(!kir.contains("= add"), "kir:\n{kir}");
    assert!(!kir.contains("= lt"), "kir:\n{kir}");
    assert!(!kir.contains("= eq"), "kir:\n{kir}");
}

#[test]
fn unary_operators_fold() {
    let kir = lower("int main() { return -(2 + 3) + +7 + !5; }");
    assert!(kir.contains("  ret 2\n"), "kir:\n{kir}");
}

#[test]
fn hex_and_octal_literals() {
    let kir = lower("int main() { return 0xF + 010; }");
    assert!(kir.contains("  ret 23\n"), "kir:\n{kir}");
}

#[test]
fn unary_on_temporaries() {
    let kir = lower("int main() { int x = 4; return -x + !x; }");
    assert!(kir.contains("= sub 0, %0"), "kir:\n{kir}");
    assert!(kir.contains("= eq 0, %"), "kir:\n{kir}");
}

#[test]
fn constant_division_by_zero_is_fatal() {
    let err = lower_err("int main() { return 1 / 0; }");
    assert!(err.contains("division by zero"), "err: {err}");
}

// === if / else ===

#[test]
fn if_else_shape() {
    let kir = lower("int main() { int a = 1; if (a) { a = 2; } else { a = 3; } return a; }");
    let expected = "\
fun @main(): i32 {
%entry:
  @a_2 = alloc i32
  store 1, @a_2
  %0 = load @a_2
  br %0, %then_1, %else_1
%then_1:
  store 2, @a_2
  jump %end_1
%else_1:
  store 3, @a_2
  jump %end_1
%end_1:
  %1 = load @a_2
  ret %1
}
";
    assert!(kir.ends_with(expected), "kir:\n{kir}");
}

#[test]
fn if_without_else_branches_to_end() {
    let kir = lower("int main() { int a = 0; if (a) { a = 1; } return a; }");
    assert!(kir.contains("br %0, %then_1, %end_1"), "kir:\n{kir}");
    assert!(!kir.contains("%else_1"), "kir:\n{kir}");
}

#[test]
fn if_with_both_arms_returning_omits_end_label() {
    let kir = lower("int main() { if (1) { return 1; } else { return 2; } }");
    assert!(!kir.contains("%end_1"), "kir:\n{kir}");
    // 两个分支都返回了, 不再补缺省的 ret 0
    assert!(!kir.contains("ret 0"), "kir:\n{kir}");
}

#[test]
fn label_groups_are_monotonic_across_functions() {
    let kir = lower(
        "int f() { if (1) { return 1; } return 0; }\nint main() { if (1) { return 2; } return 0; }",
    );
    assert!(kir.contains("%then_1"), "kir:\n{kir}");
    assert!(kir.contains("%then_2"), "kir:\n{kir}");
}

// === while / break / continue ===

#[test]
fn while_shape() {
    let kir = lower("int main() { int i = 0; while (i < 10) { i = i + 1; } return i; }");
    let expected = "\
fun @main(): i32 {
%entry:
  @i_2 = alloc i32
  store 0, @i_2
  jump %while_entry_1
%while_entry_1:
  %0 = load @i_2
  %1 = lt %0, 10
  br %1, %while_body_1, %while_end_1
%while_body_1:
  %2 = load @i_2
  %3 = add %2, 1
  store %3, @i_2
  jump %while_entry_1
%while_end_1:
  %4 = load @i_2
  ret %4
}
";
    assert!(kir.ends_with(expected), "kir:\n{kir}");
}

#[test]
fn break_jumps_to_loop_end() {
    let kir = lower("int main() { while (1) { break; } return 0; }");
    assert!(
        kir.contains("%while_body_1:\n  jump %while_end_1\n%while_end_1:"),
        "kir:\n{kir}"
    );
}

#[test]
fn continue_jumps_to_loop_entry() {
    let kir = lower("int main() { int i = 0; while (i < 3) { i = i + 1; continue; } return i; }");
    // 一次是 while 自己的入口跳转, 一次来自 continue
    assert_eq!(count(&kir, "jump %while_entry_1"), 2, "kir:\n{kir}");
}

#[test]
fn statements_after_break_are_unreachable() {
    let kir = lower("int main() { int i = 0; while (1) { break; i = 9; } return i; }");
    assert!(!kir.contains("store 9"), "kir:\n{kir}");
}

#[test]
fn statements_after_return_are_unreachable() {
    let kir = lower("int main() { int i = 0; return i; i = 9; }");
    assert!(!kir.contains("store 9"), "kir:\n{kir}");
}

#[test]
fn break_inside_if_suppresses_join_jump() {
    // then 分支以 break 离开, 不能再补 jump %end
    let kir = lower("int main() { int i = 0; while (1) { if (i) { break; } else { break; } } return i; }");
    assert!(!kir.contains("jump %end_1"), "kir:\n{kir}");
    assert!(!kir.contains("%end_1:"), "kir:\n{kir}");
    assert_eq!(count(&kir, "jump %while_end_1"), 2, "kir:\n{kir}");
}

// === 短路求值 ===

#[test]
fn land_with_temporary_lhs_branches() {
    let kir = lower("int main() { int x = 1; return x && 2; }");
    let expected = "\
  %0 = load @x_2
  %1 = ne %0, 0
  %land_slot_1 = alloc i32
  store %1, %land_slot_1
  br %1, %land_rhs_1, %land_end_1
%land_rhs_1:
  %2 = ne 2, 0
  %3 = and %1, %2
  store %3, %land_slot_1
  jump %land_end_1
%land_end_1:
  %4 = load %land_slot_1
  ret %4
}
";
    assert!(kir.ends_with(expected), "kir:\n{kir}");
}

#[test]
fn lor_with_temporary_lhs_branches() {
    let kir = lower("int main() { int x = 0; return x || 3; }");
    assert!(kir.contains("br %1, %lor_end_1, %lor_rhs_1"), "kir:\n{kir}");
    assert!(kir.contains("= or %1, %2"), "kir:\n{kir}");
    assert!(kir.contains("= load %lor_slot_1"), "kir:\n{kir}");
}

#[test]
fn land_with_constant_false_lhs_elides_rhs() {
    // 短路把对 x 的赋值整个丢掉, 程序返回 0
    let kir = lower("int main() { int x = 0; return (0 && (x = 1)) + x; }");
    let expected = "\
fun @main(): i32 {
%entry:
  @x_2 = alloc i32
  store 0, @x_2
  %0 = load @x_2
  %1 = add 0, %0
  ret %1
}
";
    assert!(kir.ends_with(expected), "kir:\n{kir}");
    assert!(!kir.contains("store 1,"), "kir:\n{kir}");
}

#[test]
fn lor_with_constant_true_lhs_folds() {
    let kir = lower("int main() { int x = 0; return 5 || (x = 1); }");
    assert!(kir.contains("  ret 1\n"), "kir:\n{kir}");
    assert!(!kir.contains("store 1,"), "kir:\n{kir}");
}

#[test]
fn land_with_constant_true_lhs_normalizes_rhs() {
    let kir = lower("int main() { int x = 7; return 2 && x; }");
    assert!(kir.contains("= ne %0, 0"), "kir:\n{kir}");
    assert!(!kir.contains("%land_rhs"), "kir:\n{kir}");
}

#[test]
fn paren_assign_yields_assigned_value() {
    let kir = lower("int main() { int x = 0; return (x = 5); }");
    assert!(kir.contains("store 5, @x_2"), "kir:\n{kir}");
    assert!(kir.contains("  ret 5\n"), "kir:\n{kir}");
}

// === 作用域与遮蔽 ===

#[test]
fn shadowing_uses_depth_suffixes() {
    let kir = lower("int main() { int a = 1; { int a = 2; a = 3; } return a; }");
    assert!(kir.contains("@a_2 = alloc i32"), "kir:\n{kir}");
    assert!(kir.contains("@a_3 = alloc i32"), "kir:\n{kir}");
    assert!(kir.contains("store 3, @a_3"), "kir:\n{kir}");
    // 块结束后读到的是外层的 a
    assert!(kir.contains("= load @a_2"), "kir:\n{kir}");
}

#[test]
fn sibling_blocks_share_one_alloc_per_depth() {
    let kir = lower("int main() { int a = 1; { int a = 2; } { int a = 3; } return 0; }");
    assert_eq!(count(&kir, "@a_3 = alloc i32"), 1, "kir:\n{kir}");
    assert!(kir.contains("store 2, @a_3"), "kir:\n{kir}");
    assert!(kir.contains("store 3, @a_3"), "kir:\n{kir}");
}

#[test]
fn each_function_reallocates_its_locals() {
    let kir = lower("void f() { int y = 1; }\nvoid g() { int y = 2; }\nint main() { return 0; }");
    assert_eq!(count(&kir, "@y_2 = alloc i32"), 2, "kir:\n{kir}");
}

#[test]
fn sibling_functions_do_not_share_the_alloc_ledger() {
    // 两个函数里层级 3 的同名块变量都要各自 alloc
    let kir = lower("void f() { { int b = 1; } }\nvoid g() { { int b = 2; } }\nint main() { return 0; }");
    assert_eq!(count(&kir, "@b_3 = alloc i32"), 2, "kir:\n{kir}");
}

#[test]
fn init_expression_sees_the_outer_binding() {
    let kir = lower("int main() { int a = 1; { int a = a + 1; } return 0; }");
    // 右边的 a 读外层 @a_2, 存进内层 @a_3
    assert!(kir.contains("%0 = load @a_2"), "kir:\n{kir}");
    assert!(kir.contains("store %1, @a_3"), "kir:\n{kir}");
}

// === 全局量与函数 ===

#[test]
fn globals_and_constants() {
    let kir = lower("int a;\nconst int C = 4;\nint main() { a = C; return a; }");
    assert!(kir.contains("global @a_1 = alloc i32, zeroinit"), "kir:\n{kir}");
    assert!(kir.contains("store 4, @a_1"), "kir:\n{kir}");
    assert!(!kir.contains("@C"), "kir:\n{kir}");
}

#[test]
fn global_with_constant_initializer() {
    let kir = lower("int g = 10;\nint main() { return g; }");
    assert!(kir.contains("global @g_1 = alloc i32, 10"), "kir:\n{kir}");
    assert!(kir.contains("= load @g_1"), "kir:\n{kir}");
}

#[test]
fn function_params_are_spilled_in_entry() {
    let kir = lower("int add(int x, int y) { return x + y; }\nint main() { return add(1, 2); }");
    let expected = "\
fun @add(%arg_0: i32, %arg_1: i32): i32 {
%entry:
  @x_2 = alloc i32
  store %arg_0, @x_2
  @y_2 = alloc i32
  store %arg_1, @y_2
  %0 = load @x_2
  %1 = load @y_2
  %2 = add %0, %1
  ret %2
}
";
    assert!(kir.contains(expected), "kir:\n{kir}");
    assert!(kir.contains("%3 = call @add(1, 2)"), "kir:\n{kir}");
}

#[test]
fn mutual_recursion_resolves() {
    let kir = lower(
        "int even(int n) { if (n == 0) { return 1; } return odd(n - 1); }\n\
         int odd(int n) { if (n == 0) { return 0; } return even(n - 1); }\n\
         int main() { return even(4); }",
    );
    assert!(kir.contains("call @odd("), "kir:\n{kir}");
    assert!(kir.contains("call @even("), "kir:\n{kir}");
}

#[test]
fn library_calls_use_declared_signatures() {
    let kir = lower("int main() { putint(getint()); return 0; }");
    assert!(kir.contains("%0 = call @getint()"), "kir:\n{kir}");
    assert!(kir.contains("  call @putint(%0)\n"), "kir:\n{kir}");
}

// === 错误用例 ===

#[test]
fn undefined_identifier_is_fatal() {
    let err = lower_err("int main() { return y; }");
    assert!(err.contains("`y` is not defined"), "err: {err}");
}

#[test]
fn assignment_to_constant_is_fatal() {
    let err = lower_err("int main() { const int c = 1; c = 2; return 0; }");
    assert!(err.contains("cannot assign to constant `c`"), "err: {err}");
}

#[test]
fn break_outside_loop_is_fatal() {
    let err = lower_err("int main() { break; }");
    assert!(err.contains("break used outside of loop"), "err: {err}");
}

#[test]
fn continue_outside_loop_is_fatal() {
    let err = lower_err("int main() { continue; }");
    assert!(err.contains("continue used outside of loop"), "err: {err}");
}

#[test]
fn non_constant_global_initializer_is_fatal() {
    let err = lower_err("int a;\nint b = a;\nint main() { return b; }");
    assert!(err.contains("not a compile-time constant"), "err: {err}");
}

#[test]
fn duplicate_declaration_in_scope_is_fatal() {
    let err = lower_err("int main() { int a = 1; int a = 2; return 0; }");
    assert!(err.contains("already declared"), "err: {err}");
}

#[test]
fn duplicate_function_definition_is_fatal() {
    let err = lower_err("int f() { return 0; }\nint f() { return 1; }\nint main() { return 0; }");
    assert!(err.contains("defined more than once"), "err: {err}");
}

#[test]
fn call_to_undeclared_function_is_fatal() {
    let err = lower_err("int main() { return h(); }");
    assert!(err.contains("`h` is not declared"), "err: {err}");
}

#[test]
fn errors_carry_source_locations() {
    let src = "int main() {\n  return y;\n}\n";
    let ast = parse(src);
    let err = generate_kir(&ast, Some(crate::utils::SourceMap::new(src)))
        .expect_err("lowering should fail")
        .to_string();
    assert!(err.contains("line 2"), "err: {err}");
}

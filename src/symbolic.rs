/// # Symbolic engine
/// a module
/// 1) turns a String expression into a symbolic expression
/// 2) turns a symbolic expression into a Rust function
/// 3) provides differentiation, simplification and substitution of symbolic expressions
///# Example#
/// ```
/// use VibroThe::symbolic::symbolic_engine::Expr;
/// let input = "T0*sin(k*x) + cos(k*x)";
/// let parsed_expression = Expr::parse_expression(input);
/// println!(" parsed_expression {}", parsed_expression);
/// // differentiate with respect to x
/// let df_dx = parsed_expression.diff("x");
/// println!("df_dx = {}", df_dx);
/// // turn a one-variable expression into a Rust closure
/// let shape = Expr::parse_expression("sin(3.14*x)");
/// let f = shape.lambdify1D();
/// println!("f(0.5) = {}", f(0.5));
/// ```
pub mod symbolic_engine;
/// a module turns a String expression into a symbolic expression
pub mod parse_expr;
/// symbolic matrices: residual Jacobians and determinants, with numeric
/// evaluation into nalgebra types
pub mod symbolic_matrix;
/// closed-form general solutions of the separated spatial equation family
pub mod symbolic_ode;

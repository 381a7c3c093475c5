//! # Parser driver
//!
//! A hand-written recursive-descent driver over the scanner's symbol
//! stream. Grammar actions call into `add_array`/`add_object` (mirroring
//! the source driver's `AddArray`/`AddObject`) to build the flat node
//! array; `add_statement` flushes the accumulated statement into the
//! statement list. Grammar errors are collected rather than raised: on a
//! parse error the driver recovers by skipping to the next statement
//! boundary (`;` or EOF) so one malformed statement never prevents the
//! rest of the script from parsing.
//!
//! Coverage is intentionally narrow (§4.C's "ambient addition"): `SELECT`
//! with projection/from/where/aliases and simple `CREATE TABLE`, which is
//! what the analysis passes and the worked scenarios need. There is no
//! generated grammar here — the teacher's tree-sitter + `cc` build-script
//! generation is an out-of-scope foreign-function shim for this core.

use sqlscript_ast::{AttributeKey, ExpressionOperator, Location, NodeId, NodeStore, NodeType};
use sqlscript_scanner::{Keyword, NameId, ScannedScript, Symbol, TokenKind};

use crate::error::{ParseDiagnostic, ParseErrorKind};
use crate::qualified_name::QualifiedNameParts;
use crate::statement::{Statement, StatementType};

/// Flat node array + ordered statements + collected errors, the parser's
/// output (§6 `Parse(ScannedScript) -> ParsedScript | Errors`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ParsedScript {
    pub nodes: NodeStore,
    pub statements: Vec<Statement>,
    pub errors: Vec<ParseDiagnostic>,
    /// Locations marked as DSON option keys by `add_dson_field`. The
    /// hand-written grammar never emits DSON statements (board/dashboard
    /// specs are out of this core's scope, see DESIGN.md), so this is
    /// always empty today; it is kept so `ParsedScript`'s shape matches
    /// §6's "dson-key locations" without a later breaking change.
    pub dson_key_locations: Vec<Location>,
}

struct Driver<'a> {
    symbols: &'a [Symbol],
    text: &'a str,
    pos: usize,
    prev_location: Location,
    nodes: NodeStore,
    statements: Vec<Statement>,
    errors: Vec<ParseDiagnostic>,
    dson_key_locations: Vec<Location>,
    stmt_table_refs: Vec<(NodeId, QualifiedNameParts)>,
    stmt_column_refs: Vec<NodeId>,
}

impl<'a> Driver<'a> {
    fn new(scanned: &'a ScannedScript) -> Self {
        Self {
            symbols: &scanned.symbol_list,
            text: &scanned.text,
            pos: 0,
            prev_location: Location::default(),
            nodes: NodeStore::new(),
            statements: Vec::new(),
            errors: Vec::new(),
            dson_key_locations: Vec::new(),
            stmt_table_refs: Vec::new(),
            stmt_column_refs: Vec::new(),
        }
    }

    fn peek_symbol(&self) -> Symbol {
        self.symbols[self.pos.min(self.symbols.len() - 1)]
    }

    fn peek(&self) -> TokenKind {
        self.peek_symbol().kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Symbol {
        let sym = self.peek_symbol();
        if self.pos + 1 < self.symbols.len() {
            self.pos += 1;
        }
        self.prev_location = sym.location;
        sym
    }

    fn expect(&mut self, kind: TokenKind) -> Option<Symbol> {
        if self.at(kind) {
            Some(self.advance())
        } else {
            self.error_here(format!("expected {kind:?}, found {:?}", self.peek()));
            None
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Option<Symbol> {
        self.expect(TokenKind::Keyword(keyword))
    }

    fn error_here(&mut self, message: impl Into<String>) {
        self.errors.push(ParseDiagnostic {
            kind: ParseErrorKind::Grammar,
            location: self.peek_symbol().location,
            message: message.into(),
        });
    }

    fn recover_to_statement_boundary(&mut self) {
        while !self.at(TokenKind::Semicolon) && !self.at_eof() {
            self.advance();
        }
    }

    fn add_statement(&mut self, statement_type: StatementType, root: NodeId, name: Option<QualifiedNameParts>) {
        let table_refs = std::mem::take(&mut self.stmt_table_refs);
        let column_refs = std::mem::take(&mut self.stmt_column_refs);
        self.statements.push(Statement {
            statement_type,
            root_node_id: root,
            name,
            table_refs,
            column_refs,
        });
    }

    /// Marks `location` as a DSON option key. No grammar production in
    /// this driver calls this today (see [`ParsedScript::dson_key_locations`]);
    /// kept so the driver's public surface matches §4.C's `AddDSONField`.
    #[allow(dead_code)]
    fn add_dson_field(&mut self, location: Location) {
        self.dson_key_locations.push(location);
    }

    fn add_qualified_name_node(&mut self, parts: &[(Location, NameId)]) -> NodeId {
        let scalars: Vec<NodeId> = parts
            .iter()
            .map(|(loc, id)| self.nodes.add_scalar(*loc, NodeType::StringRef, id.0))
            .collect();
        let mut attrs = Vec::new();
        match scalars.len() {
            0 => {}
            1 => attrs.push((AttributeKey::SqlQualifiedNameRelation, scalars[0])),
            2 => {
                attrs.push((AttributeKey::SqlQualifiedNameSchema, scalars[0]));
                attrs.push((AttributeKey::SqlQualifiedNameRelation, scalars[1]));
            }
            n => {
                attrs.push((AttributeKey::SqlQualifiedNameCatalog, scalars[n - 3]));
                attrs.push((AttributeKey::SqlQualifiedNameSchema, scalars[n - 2]));
                attrs.push((AttributeKey::SqlQualifiedNameRelation, scalars[n - 1]));
            }
        }
        let loc = Location::merge(parts.iter().map(|(l, _)| *l));
        self.nodes.add_object(loc, NodeType::ObjectSqlQualifiedName, attrs)
    }

    fn parse_name_path(&mut self) -> Vec<(Location, NameId)> {
        let mut parts = Vec::new();
        if let Some(sym) = self.expect(TokenKind::Ident) {
            parts.push((sym.location, sym.name.expect("ident symbol carries a name")));
        }
        while self.at(TokenKind::Dot) {
            self.advance();
            if let Some(sym) = self.expect(TokenKind::Ident) {
                parts.push((sym.location, sym.name.expect("ident symbol carries a name")));
            }
        }
        parts
    }

    fn make_binary(&mut self, op: ExpressionOperator, left: NodeId, right: NodeId, op_loc: Location) -> NodeId {
        let op_node = self.nodes.add_scalar(op_loc, NodeType::EnumExpressionOperator, op.to_u32());
        let left_loc = self.nodes.get(left).location;
        let right_loc = self.nodes.get(right).location;
        let span = Location::merge([left_loc, right_loc]);
        let args = self.nodes.add_array(span, vec![left, right]);
        self.nodes.add_object(
            span,
            NodeType::ObjectSqlNaryExpression,
            vec![
                (AttributeKey::SqlExpressionOperator, op_node),
                (AttributeKey::SqlExpressionArgs, args),
            ],
        )
    }

    fn parse_expr(&mut self) -> NodeId {
        self.parse_or()
    }

    fn parse_or(&mut self) -> NodeId {
        let mut left = self.parse_and();
        while self.at(TokenKind::Keyword(Keyword::Or)) {
            let op_loc = self.advance().location;
            let right = self.parse_and();
            left = self.make_binary(ExpressionOperator::Or, left, right, op_loc);
        }
        left
    }

    fn parse_and(&mut self) -> NodeId {
        let mut left = self.parse_not();
        while self.at(TokenKind::Keyword(Keyword::And)) {
            let op_loc = self.advance().location;
            let right = self.parse_not();
            left = self.make_binary(ExpressionOperator::And, left, right, op_loc);
        }
        left
    }

    fn parse_not(&mut self) -> NodeId {
        if self.at(TokenKind::Keyword(Keyword::Not)) {
            let op_loc = self.advance().location;
            let operand = self.parse_not();
            let op_node = self.nodes.add_scalar(op_loc, NodeType::EnumExpressionOperator, ExpressionOperator::Not.to_u32());
            let operand_loc = self.nodes.get(operand).location;
            let span = Location::merge([op_loc, operand_loc]);
            let args = self.nodes.add_array(operand_loc, vec![operand]);
            return self.nodes.add_object(
                span,
                NodeType::ObjectSqlNaryExpression,
                vec![
                    (AttributeKey::SqlExpressionOperator, op_node),
                    (AttributeKey::SqlExpressionArgs, args),
                ],
            );
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> NodeId {
        let left = self.parse_additive();
        let op = match self.peek() {
            TokenKind::Eq => Some(ExpressionOperator::Eq),
            TokenKind::NotEq => Some(ExpressionOperator::NotEq),
            TokenKind::Lt => Some(ExpressionOperator::Lt),
            TokenKind::LtEq => Some(ExpressionOperator::LtEq),
            TokenKind::Gt => Some(ExpressionOperator::Gt),
            TokenKind::GtEq => Some(ExpressionOperator::GtEq),
            _ => None,
        };
        let Some(op) = op else { return left };
        let op_loc = self.advance().location;
        let right = self.parse_additive();
        self.make_binary(op, left, right, op_loc)
    }

    fn parse_additive(&mut self) -> NodeId {
        let mut left = self.parse_term();
        loop {
            let op = match self.peek() {
                TokenKind::Plus => Some(ExpressionOperator::Plus),
                TokenKind::Minus => Some(ExpressionOperator::Minus),
                _ => None,
            };
            let Some(op) = op else { break };
            let op_loc = self.advance().location;
            let right = self.parse_term();
            left = self.make_binary(op, left, right, op_loc);
        }
        left
    }

    fn parse_term(&mut self) -> NodeId {
        let mut left = self.parse_unary();
        loop {
            let op = match self.peek() {
                TokenKind::Star => Some(ExpressionOperator::Multiply),
                TokenKind::Slash => Some(ExpressionOperator::Divide),
                TokenKind::Percent => Some(ExpressionOperator::Modulus),
                TokenKind::Caret => Some(ExpressionOperator::Xor),
                _ => None,
            };
            let Some(op) = op else { break };
            let op_loc = self.advance().location;
            let right = self.parse_unary();
            left = self.make_binary(op, left, right, op_loc);
        }
        left
    }

    fn parse_unary(&mut self) -> NodeId {
        if self.at(TokenKind::Minus) {
            let op_loc = self.advance().location;
            let operand = self.parse_unary();
            let op_node = self.nodes.add_scalar(op_loc, NodeType::EnumExpressionOperator, ExpressionOperator::Negate.to_u32());
            let operand_loc = self.nodes.get(operand).location;
            let span = Location::merge([op_loc, operand_loc]);
            let args = self.nodes.add_array(operand_loc, vec![operand]);
            return self.nodes.add_object(
                span,
                NodeType::ObjectSqlNaryExpression,
                vec![
                    (AttributeKey::SqlExpressionOperator, op_node),
                    (AttributeKey::SqlExpressionArgs, args),
                ],
            );
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> NodeId {
        match self.peek() {
            TokenKind::Keyword(Keyword::Null) => {
                let s = self.advance();
                self.nodes.add_scalar(s.location, NodeType::LiteralNull, 0)
            }
            TokenKind::Keyword(Keyword::True) => {
                let s = self.advance();
                self.nodes.add_scalar(s.location, NodeType::LiteralBoolean, 1)
            }
            TokenKind::Keyword(Keyword::False) => {
                let s = self.advance();
                self.nodes.add_scalar(s.location, NodeType::LiteralBoolean, 0)
            }
            TokenKind::IntegerLiteral => {
                let s = self.advance();
                let text = &self.text[s.location.offset as usize..s.location.end() as usize];
                let value: i64 = text.parse().unwrap_or_default();
                let idx = self.nodes.int_literals.len() as u32;
                self.nodes.int_literals.push(value);
                self.nodes.add_scalar(s.location, NodeType::LiteralInteger, idx)
            }
            TokenKind::FloatLiteral => {
                let s = self.advance();
                let text = &self.text[s.location.offset as usize..s.location.end() as usize];
                let value: f64 = text.parse().unwrap_or_default();
                let idx = self.nodes.float_literals.len() as u32;
                self.nodes.float_literals.push(value);
                self.nodes.add_scalar(s.location, NodeType::LiteralFloat, idx)
            }
            TokenKind::StringLiteral => {
                let s = self.advance();
                self.nodes
                    .add_scalar(s.location, NodeType::LiteralString, s.name.expect("string symbol carries a name").0)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect(TokenKind::RParen);
                inner
            }
            TokenKind::Ident => self.parse_ident_led(),
            _ => {
                self.error_here(format!("expected expression, found {:?}", self.peek()));
                let loc = self.peek_symbol().location;
                self.nodes.add_scalar(loc, NodeType::LiteralNull, 0)
            }
        }
    }

    fn parse_ident_led(&mut self) -> NodeId {
        let parts = self.parse_name_path();
        if parts.len() == 1 && self.at(TokenKind::LParen) {
            return self.parse_function_call(parts[0]);
        }
        let name_node = self.add_qualified_name_node(&parts);
        let loc = self.nodes.get(name_node).location;
        let node = self.nodes.add_object(
            loc,
            NodeType::ObjectSqlColumnRef,
            vec![(AttributeKey::SqlColumnRefPath, name_node)],
        );
        self.stmt_column_refs.push(node);
        node
    }

    fn parse_function_call(&mut self, name: (Location, NameId)) -> NodeId {
        self.advance(); // '('
        let mut args = Vec::new();
        let mut modifiers = Vec::new();
        if self.at(TokenKind::Keyword(Keyword::Distinct)) {
            let s = self.advance();
            modifiers.push(self.nodes.add_scalar(s.location, NodeType::Bool, 1));
        }
        if self.at(TokenKind::Star) {
            let s = self.advance();
            args.push(self.nodes.add_scalar(s.location, NodeType::Wildcard, 0));
        } else if !self.at(TokenKind::RParen) {
            args.push(self.parse_expr());
            while self.at(TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expr());
            }
        }
        let close = self.expect(TokenKind::RParen);
        let name_node = self.nodes.add_scalar(name.0, NodeType::StringRef, name.1 .0);
        let args_span = Location::merge(args.iter().map(|id| self.nodes.get(*id).location).chain([name.0]));
        let args_node = self.nodes.add_array(args_span, args);
        let modifiers_node = self.nodes.add_array(name.0, modifiers);
        let end = close.map(|s| s.location).unwrap_or(name.0);
        let span = Location::merge([name.0, end]);
        self.nodes.add_object(
            span,
            NodeType::ObjectSqlFunctionExpression,
            vec![
                (AttributeKey::SqlFunctionName, name_node),
                (AttributeKey::SqlFunctionArgs, args_node),
                (AttributeKey::SqlFunctionModifiers, modifiers_node),
            ],
        )
    }

    fn parse_alias(&mut self) -> Option<(Location, NameId)> {
        if self.at(TokenKind::Keyword(Keyword::As)) {
            self.advance();
            let sym = self.expect(TokenKind::Ident)?;
            Some((sym.location, sym.name.expect("ident symbol carries a name")))
        } else if self.at(TokenKind::Ident) {
            let sym = self.advance();
            Some((sym.location, sym.name.expect("ident symbol carries a name")))
        } else {
            None
        }
    }

    fn parse_select_item(&mut self) -> NodeId {
        let expr = self.parse_expr();
        let alias = self.parse_alias();
        let alias_node = alias.map(|(loc, id)| self.nodes.add_scalar(loc, NodeType::StringRef, id.0));
        let mut attrs = vec![(AttributeKey::SqlSelectItemExpr, expr)];
        if let Some(a) = alias_node {
            attrs.push((AttributeKey::SqlSelectItemAlias, a));
        }
        let expr_loc = self.nodes.get(expr).location;
        let span = alias_node.map_or(expr_loc, |a| Location::merge([expr_loc, self.nodes.get(a).location]));
        self.nodes.add_object(span, NodeType::ObjectSqlSelectItem, attrs)
    }

    fn parse_projection(&mut self) -> NodeId {
        if self.at(TokenKind::Star) {
            let s = self.advance();
            let wildcard = self.nodes.add_scalar(s.location, NodeType::Wildcard, 0);
            return self.nodes.add_array(s.location, vec![wildcard]);
        }
        let mut items = vec![self.parse_select_item()];
        while self.at(TokenKind::Comma) {
            self.advance();
            items.push(self.parse_select_item());
        }
        let span = Location::merge(items.iter().map(|id| self.nodes.get(*id).location));
        self.nodes.add_array(span, items)
    }

    fn parse_table_ref(&mut self) -> NodeId {
        let parts = self.parse_name_path();
        let Some(qualified) = QualifiedNameParts::from_parts(&parts) else {
            let loc = self.peek_symbol().location;
            return self.nodes.add_scalar(loc, NodeType::Null, 0);
        };
        let name_node = self.add_qualified_name_node(&parts);

        let mut inline_columns = Vec::new();
        if self.at(TokenKind::LParen) {
            self.advance();
            if !self.at(TokenKind::RParen) {
                if let Some(sym) = self.expect(TokenKind::Ident) {
                    inline_columns.push(self.nodes.add_scalar(sym.location, NodeType::StringRef, sym.name.expect("ident symbol carries a name").0));
                }
                while self.at(TokenKind::Comma) {
                    self.advance();
                    if let Some(sym) = self.expect(TokenKind::Ident) {
                        inline_columns.push(self.nodes.add_scalar(sym.location, NodeType::StringRef, sym.name.expect("ident symbol carries a name").0));
                    }
                }
            }
            self.expect(TokenKind::RParen);
        }

        let alias = self.parse_alias();
        let alias_node = alias.map(|(loc, id)| self.nodes.add_scalar(loc, NodeType::StringRef, id.0));

        let mut attrs = vec![(AttributeKey::SqlTableRefName, name_node)];
        if !inline_columns.is_empty() {
            let span = Location::merge(inline_columns.iter().map(|id| self.nodes.get(*id).location));
            let cols_node = self.nodes.add_array(span, inline_columns);
            attrs.push((AttributeKey::SqlTableRefColumns, cols_node));
        }
        if let Some(a) = alias_node {
            attrs.push((AttributeKey::SqlTableRefAlias, a));
        }

        let mut span = self.nodes.get(name_node).location;
        if let Some(a) = alias_node {
            span = Location::merge([span, self.nodes.get(a).location]);
        }
        let node = self.nodes.add_object(span, NodeType::ObjectSqlTableRef, attrs);
        self.stmt_table_refs.push((node, qualified));
        node
    }

    fn parse_table_ref_list(&mut self) -> NodeId {
        let mut refs = vec![self.parse_table_ref()];
        while self.at(TokenKind::Comma) {
            self.advance();
            refs.push(self.parse_table_ref());
        }
        let span = Location::merge(refs.iter().map(|id| self.nodes.get(*id).location));
        self.nodes.add_array(span, refs)
    }

    fn parse_select_statement(&mut self) {
        let start = self.advance(); // SELECT
        let mut distinct = None;
        if self.at(TokenKind::Keyword(Keyword::Distinct)) {
            let s = self.advance();
            distinct = Some(self.nodes.add_scalar(s.location, NodeType::Bool, 1));
        }
        let projection = self.parse_projection();
        let from = if self.at(TokenKind::Keyword(Keyword::From)) {
            self.advance();
            Some(self.parse_table_ref_list())
        } else {
            None
        };
        let where_expr = if self.at(TokenKind::Keyword(Keyword::Where)) {
            self.advance();
            Some(self.parse_expr())
        } else {
            None
        };

        let mut attrs = vec![(AttributeKey::SqlSelectProjection, projection)];
        if let Some(from) = from {
            attrs.push((AttributeKey::SqlSelectFrom, from));
        }
        if let Some(d) = distinct {
            attrs.push((AttributeKey::SqlSelectDistinct, d));
        }
        if let Some(w) = where_expr {
            attrs.push((AttributeKey::SqlSelectWhere, w));
        }
        let span = Location::merge([start.location, self.prev_location]);
        let root = self.nodes.add_object(span, NodeType::ObjectSqlSelect, attrs);
        self.add_statement(StatementType::Select, root, None);
    }

    fn parse_column_def(&mut self) -> NodeId {
        let name_sym = self.expect(TokenKind::Ident);
        let name_node = name_sym.map(|s| self.nodes.add_scalar(s.location, NodeType::StringRef, s.name.expect("ident symbol carries a name").0));
        let type_node = if self.at(TokenKind::Ident) {
            let s = self.advance();
            Some(self.nodes.add_scalar(s.location, NodeType::StringRef, s.name.expect("ident symbol carries a name").0))
        } else {
            None
        };
        let mut attrs = Vec::new();
        if let Some(n) = name_node {
            attrs.push((AttributeKey::SqlColumnDefName, n));
        }
        if let Some(t) = type_node {
            attrs.push((AttributeKey::SqlColumnDefType, t));
        }
        let span = Location::merge(attrs.iter().map(|(_, id)| self.nodes.get(*id).location));
        self.nodes.add_object(span, NodeType::ObjectSqlColumnDef, attrs)
    }

    fn parse_create_statement(&mut self) {
        let start = self.advance(); // CREATE
        self.expect_keyword(Keyword::Table);
        let parts = self.parse_name_path();
        let qualified = QualifiedNameParts::from_parts(&parts);
        let name_node = self.add_qualified_name_node(&parts);
        self.expect(TokenKind::LParen);
        let mut columns = Vec::new();
        if !self.at(TokenKind::RParen) {
            columns.push(self.parse_column_def());
            while self.at(TokenKind::Comma) {
                self.advance();
                columns.push(self.parse_column_def());
            }
        }
        self.expect(TokenKind::RParen);
        let elements_span = Location::merge(columns.iter().map(|id| self.nodes.get(*id).location));
        let elements = self.nodes.add_array(elements_span, columns);
        let span = Location::merge([start.location, self.prev_location]);
        let root = self.nodes.add_object(
            span,
            NodeType::ObjectSqlCreate,
            vec![
                (AttributeKey::SqlCreateName, name_node),
                (AttributeKey::SqlCreateElements, elements),
            ],
        );
        self.add_statement(StatementType::Create, root, qualified);
    }

    fn parse_statement(&mut self) {
        self.stmt_table_refs.clear();
        self.stmt_column_refs.clear();
        match self.peek() {
            TokenKind::Keyword(Keyword::Select) => self.parse_select_statement(),
            TokenKind::Keyword(Keyword::Create) => self.parse_create_statement(),
            _ => {
                self.error_here(format!("expected a SELECT or CREATE statement, found {:?}", self.peek()));
                self.recover_to_statement_boundary();
            }
        }
    }

    fn run(mut self) -> ParsedScript {
        while !self.at_eof() {
            if self.at(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            self.parse_statement();
            if self.at(TokenKind::Semicolon) {
                self.advance();
            }
        }
        ParsedScript {
            nodes: self.nodes,
            statements: self.statements,
            errors: self.errors,
            dson_key_locations: self.dson_key_locations,
        }
    }
}

/// Parse a scanned script into a [`ParsedScript`]. Never fails: grammar
/// errors are collected into `ParsedScript::errors` and the driver
/// recovers at the next statement boundary, so one bad statement never
/// discards the rest of the script.
#[tracing::instrument(skip(scanned))]
pub fn parse(scanned: &ScannedScript) -> ParsedScript {
    Driver::new(scanned).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlscript_ast::lookup_attribute;

    fn parse_text(text: &str) -> ParsedScript {
        let scanned = sqlscript_scanner::scan(text);
        parse(&scanned)
    }

    #[test]
    fn parses_simple_select() {
        let parsed = parse_text("select * from A b, C d where b.x = d.y");
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.statements.len(), 1);
        let stmt = &parsed.statements[0];
        assert_eq!(stmt.table_refs.len(), 2);
        assert_eq!(stmt.column_refs.len(), 2);
        let root = parsed.nodes.get(stmt.root_node_id);
        assert_eq!(root.node_type, NodeType::ObjectSqlSelect);
    }

    #[test]
    fn equality_node_is_nary_expression() {
        let parsed = parse_text("select 1 from A where 1 = 1");
        let stmt = &parsed.statements[0];
        let root = stmt.root_node_id;
        let where_id = lookup_attribute(&parsed.nodes, root, AttributeKey::SqlSelectWhere).unwrap();
        assert_eq!(parsed.nodes.get(where_id).node_type, NodeType::ObjectSqlNaryExpression);
    }

    #[test]
    fn children_precede_their_parents() {
        let parsed = parse_text("select a + 1 from T");
        for id in parsed.nodes.iter_bottom_up() {
            let node = parsed.nodes.get(id);
            if node.node_type.is_array() || node.node_type.is_object() {
                for child in parsed.nodes.children_of(id) {
                    assert!(child.0 < id.0);
                }
            }
        }
    }

    #[test]
    fn table_ref_with_inline_columns_records_them() {
        let parsed = parse_text("select (a + 1) * 2 from T(a)");
        let stmt = &parsed.statements[0];
        assert_eq!(stmt.table_refs.len(), 1);
        let (ref_id, _) = stmt.table_refs[0];
        let cols = lookup_attribute(&parsed.nodes, ref_id, AttributeKey::SqlTableRefColumns);
        assert!(cols.is_some());
    }

    #[test]
    fn duplicate_alias_still_parses_both_refs() {
        let parsed = parse_text("select 1 from A x, C x");
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.statements[0].table_refs.len(), 2);
    }

    #[test]
    fn create_table_parses_columns() {
        let parsed = parse_text("create table main.public.people (id int, name text)");
        assert!(parsed.errors.is_empty());
        let stmt = &parsed.statements[0];
        assert_eq!(stmt.statement_type as u8, StatementType::Create as u8);
        let root = stmt.root_node_id;
        let elements = lookup_attribute(&parsed.nodes, root, AttributeKey::SqlCreateElements).unwrap();
        assert_eq!(parsed.nodes.children_of(elements).len(), 2);
    }

    #[test]
    fn bad_statement_recovers_at_next_semicolon() {
        let parsed = parse_text("bogus tokens here; select 1 from T");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.statements.len(), 1);
    }
}

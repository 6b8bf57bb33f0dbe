//! Static language tables for VintLang.
//!
//! Fixed catalogs of keywords, built-in functions, modules and
//! declarative statements, plus the documentation and signature tables
//! used by hover, completion, signature help and inlay hints.

/// Language keywords.
pub const KEYWORDS: &[&str] = &[
    "if", "else", "elif", "while", "for", "in", "switch", "case", "default", "break",
    "continue", "func", "return", "let", "declare", "defer", "import", "package", "include",
    "true", "false", "null", "try", "catch", "throw", "finally",
];

/// Built-in functions available without an import.
pub const BUILTINS: &[&str] = &[
    "print", "println", "write", "type", "convert", "has_key", "len", "range", "split", "join",
    "replace", "contains", "startsWith", "endsWith", "trim", "upper", "lower", "push", "pop",
    "shift", "unshift", "slice", "splice", "sort", "reverse", "abs", "ceil", "floor", "round",
    "max", "min", "sqrt", "pow", "random", "now", "format", "add", "subtract", "isLeapYear",
    "exec", "env", "args", "exit",
];

/// Standard library modules.
pub const MODULES: &[&str] = &[
    "time", "net", "os", "json", "csv", "regex", "crypto", "encoding", "colors", "term",
];

/// Declarative statement words (`todo "..."`, `warn "..."`, ...).
pub const DECLARATIVES: &[&str] = &["todo", "warn", "error", "info", "debug", "note", "success"];

/// Keyword that introduces a declaration.
pub const DECLARATION_KEYWORD: &str = "let";

/// Keyword that introduces a function literal.
pub const FUNCTION_KEYWORD: &str = "func";

/// Literal keywords highlighted as constants.
pub const LITERAL_KEYWORDS: &[&str] = &["true", "false", "null"];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

pub fn is_builtin(word: &str) -> bool {
    BUILTINS.contains(&word)
}

pub fn is_module(word: &str) -> bool {
    MODULES.contains(&word)
}

/// Keywords and builtins can never name a user symbol.
pub fn is_reserved(word: &str) -> bool {
    is_keyword(word) || is_builtin(word)
}

/// Signature of a built-in function.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinSignature {
    pub name: &'static str,
    pub parameters: &'static [&'static str],
    pub description: &'static str,
}

impl BuiltinSignature {
    /// Render as `name(a, b)`.
    pub fn label(&self) -> String {
        format!("{}({})", self.name, self.parameters.join(", "))
    }
}

const SIGNATURES: &[BuiltinSignature] = &[
    BuiltinSignature {
        name: "print",
        parameters: &["value"],
        description: "Prints a value to the console.",
    },
    BuiltinSignature {
        name: "println",
        parameters: &["value"],
        description: "Prints a value to the console with a newline.",
    },
    BuiltinSignature {
        name: "write",
        parameters: &["value"],
        description: "Writes a value without a trailing newline.",
    },
    BuiltinSignature {
        name: "type",
        parameters: &["value"],
        description: "Returns the type of a value.",
    },
    BuiltinSignature {
        name: "convert",
        parameters: &["value", "type"],
        description: "Converts a value to the specified type.",
    },
    BuiltinSignature {
        name: "has_key",
        parameters: &["map", "key"],
        description: "Reports whether a map contains a key.",
    },
    BuiltinSignature {
        name: "len",
        parameters: &["value"],
        description: "Returns the length of a string, array or map.",
    },
    BuiltinSignature {
        name: "range",
        parameters: &["start", "end", "step"],
        description: "Builds an array of integers from start up to end.",
    },
    BuiltinSignature {
        name: "split",
        parameters: &["text", "separator"],
        description: "Splits a string into an array.",
    },
    BuiltinSignature {
        name: "join",
        parameters: &["items", "separator"],
        description: "Joins an array of strings.",
    },
    BuiltinSignature {
        name: "replace",
        parameters: &["text", "old", "new"],
        description: "Replaces every occurrence of a substring.",
    },
    BuiltinSignature {
        name: "contains",
        parameters: &["text", "substring"],
        description: "Reports whether a string contains a substring.",
    },
    BuiltinSignature {
        name: "startsWith",
        parameters: &["text", "prefix"],
        description: "Reports whether a string starts with a prefix.",
    },
    BuiltinSignature {
        name: "endsWith",
        parameters: &["text", "suffix"],
        description: "Reports whether a string ends with a suffix.",
    },
    BuiltinSignature {
        name: "push",
        parameters: &["array", "value"],
        description: "Appends a value to an array.",
    },
    BuiltinSignature {
        name: "slice",
        parameters: &["array", "start", "end"],
        description: "Returns a portion of an array.",
    },
    BuiltinSignature {
        name: "max",
        parameters: &["a", "b"],
        description: "Returns the larger of two numbers.",
    },
    BuiltinSignature {
        name: "min",
        parameters: &["a", "b"],
        description: "Returns the smaller of two numbers.",
    },
    BuiltinSignature {
        name: "pow",
        parameters: &["base", "exponent"],
        description: "Raises a number to a power.",
    },
    BuiltinSignature {
        name: "sqrt",
        parameters: &["value"],
        description: "Returns the square root of a number.",
    },
    BuiltinSignature {
        name: "format",
        parameters: &["time", "layout"],
        description: "Formats a time value.",
    },
    BuiltinSignature {
        name: "add",
        parameters: &["time", "duration"],
        description: "Adds a duration to a time value.",
    },
    BuiltinSignature {
        name: "subtract",
        parameters: &["time", "duration"],
        description: "Subtracts a duration from a time value.",
    },
    BuiltinSignature {
        name: "isLeapYear",
        parameters: &["year"],
        description: "Reports whether a year is a leap year.",
    },
    BuiltinSignature {
        name: "exec",
        parameters: &["command"],
        description: "Runs a shell command and returns its output.",
    },
    BuiltinSignature {
        name: "env",
        parameters: &["name"],
        description: "Reads an environment variable.",
    },
    BuiltinSignature {
        name: "exit",
        parameters: &["code"],
        description: "Terminates the program with an exit code.",
    },
];

/// Look up the signature of a built-in function.
pub fn builtin_signature(name: &str) -> Option<&'static BuiltinSignature> {
    SIGNATURES.iter().find(|sig| sig.name == name)
}

/// Markdown documentation shown on hover.
pub fn hover_documentation(word: &str) -> Option<&'static str> {
    let doc = match word {
        "print" => "**print(value)** - Prints a value to the console\n\n```vint\nprint(\"Hello, World!\")\n```",
        "println" => "**println(value)** - Prints a value to the console with a newline\n\n```vint\nprintln(\"Hello, World!\")\n```",
        "func" => "**func** - Defines a function\n\n```vint\nlet myFunction = func(param1, param2) {\n    return param1 + param2\n}\n```",
        "let" => "**let** - Declares a variable\n\n```vint\nlet myVariable = \"Hello\"\nlet myNumber = 42\n```",
        "if" => "**if** - Conditional statement\n\n```vint\nif (condition) {\n    // code\n} else {\n    // alternative code\n}\n```",
        "for" => "**for** - Loop statement\n\n```vint\nfor item in collection {\n    print(item)\n}\n```",
        "while" => "**while** - Loop statement\n\n```vint\nwhile (condition) {\n    // code\n}\n```",
        "import" => "**import** - Imports a module\n\n```vint\nimport time\nimport net\n```",
        "type" => "**type(value)** - Returns the type of a value\n\n```vint\nlet t = type(42)  // \"INTEGER\"\n```",
        "convert" => "**convert(value, type)** - Converts a value to the specified type\n\n```vint\nlet str = \"123\"\nconvert(str, \"INTEGER\")\n```",
        "time" => "**time** - Module for time-related operations\n\nFunctions:\n- `now()` - Get current timestamp\n- `format(time, layout)` - Format time\n- `add(time, duration)` - Add duration to time\n- `subtract(time, duration)` - Subtract duration from time\n- `isLeapYear(year)` - Check if year is leap year",
        "net" => "**net** - Module for network operations\n\nFunctions:\n- `get(url)` - HTTP GET request\n- `post(url, data)` - HTTP POST request\n- `put(url, data)` - HTTP PUT request\n- `delete(url)` - HTTP DELETE request",
        "json" => "**json** - Module for JSON operations\n\nFunctions:\n- `parse(text)` - Parse a JSON string\n- `stringify(value)` - Serialize a value to JSON",
        "defer" => "**defer** - Defers execution until function returns\n\n```vint\nlet myFunc = func() {\n    defer println(\"This runs last\")\n    println(\"This runs first\")\n}\n```",
        _ => return None,
    };
    Some(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogs_are_disjoint() {
        for kw in KEYWORDS {
            assert!(!is_builtin(kw), "{kw} is both keyword and builtin");
            assert!(!is_module(kw), "{kw} is both keyword and module");
        }
        for builtin in BUILTINS {
            assert!(!is_module(builtin), "{builtin} is both builtin and module");
        }
    }

    #[test]
    fn test_signatures_are_builtins() {
        for sig in SIGNATURES {
            assert!(is_builtin(sig.name), "{} has a signature but is not a builtin", sig.name);
        }
        assert_eq!(builtin_signature("convert").map(|s| s.label()), Some("convert(value, type)".to_string()));
    }

    #[test]
    fn test_hover_documentation_lookup() {
        assert!(hover_documentation("let").is_some());
        assert!(hover_documentation("time").is_some());
        assert!(hover_documentation("nothing_here").is_none());
    }
}

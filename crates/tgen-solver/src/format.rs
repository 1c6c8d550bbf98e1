//! TypeScript-flavored rendering of [`Type`] values.
//!
//! Used for diagnostics, cache-key debugging and object-literal metadata.
//! The output is re-parseable by the TypeScript plugin for the shapes the
//! plugin understands.

use crate::types::{self, Type};
use std::fmt;

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, self)?;
        if self.is_nullable() && !self.is_nullish() {
            f.write_str(" | null")?;
        }
        Ok(())
    }
}

fn write_type(f: &mut fmt::Formatter<'_>, ty: &Type) -> fmt::Result {
    match ty.name() {
        types::FUNCTION if ty.is_function() => {
            f.write_str("(")?;
            for (i, param) in ty.function_params().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "arg{i}: {param}")?;
            }
            f.write_str(") => ")?;
            match ty.function_return() {
                Some(ret) => write!(f, "{ret}"),
                None => f.write_str(types::UNKNOWN),
            }
        }
        types::ARRAY if ty.parameters().len() == 1 => {
            let element = &ty.parameters()[0];
            if needs_parens(element) {
                write!(f, "({element})[]")
            } else {
                write!(f, "{element}[]")
            }
        }
        types::UNION if ty.is_generic() => write_joined(f, ty.parameters(), " | "),
        types::INTERSECTION if ty.is_generic() => write_joined(f, ty.parameters(), " & "),
        types::TUPLE => {
            f.write_str("[")?;
            for (i, element) in ty.parameters().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{element}")?;
            }
            f.write_str("]")
        }
        types::OBJECT => {
            let properties = ty.object_properties();
            if properties.is_empty() {
                return f.write_str(types::OBJECT);
            }
            f.write_str("{ ")?;
            for (i, (name, property)) in properties.iter().enumerate() {
                if i > 0 {
                    f.write_str("; ")?;
                }
                write!(f, "{name}: {property}")?;
            }
            f.write_str(" }")
        }
        name => {
            f.write_str(name)?;
            if ty.is_generic() {
                f.write_str("<")?;
                for (i, param) in ty.parameters().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                f.write_str(">")?;
            }
            Ok(())
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, members: &[Type], sep: &str) -> fmt::Result {
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        if member.is_function() {
            write!(f, "({member})")?;
        } else {
            write!(f, "{member}")?;
        }
    }
    Ok(())
}

fn needs_parens(ty: &Type) -> bool {
    ty.is_union() || ty.is_intersection() || ty.is_function() || ty.is_nullable()
}
